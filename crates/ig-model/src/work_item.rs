//! Work item domain model.
//!
//! Work items are units of human work (approvals, remediations,
//! certification reviews). The owner is the header's `owner`; every change
//! of owner is recorded in [`OwnerHistory`]. Completed items are copied
//! into a [`WorkItemArchive`] that no longer references live objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::error::{ModelError, ModelResult};
use crate::identity::Identity;
use crate::macros::str_enum;
use crate::object::{persistent_object, with_attributes, ObjectHeader, PersistentObject};
use crate::reference::Reference;

/// Kind of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum WorkItemType {
    #[default]
    Generic,
    Approval,
    Certification,
    Delegation,
    Remediation,
    ViolationReview,
    Form,
    Event,
}

/// Completion state. Open items have no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum WorkItemState {
    Finished,
    Rejected,
    Returned,
    Expired,
    Pending,
    Canceled,
}

/// Priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum WorkItemLevel {
    Low,
    #[default]
    Normal,
    High,
}

str_enum!(WorkItemType {
    Generic => "Generic",
    Approval => "Approval",
    Certification => "Certification",
    Delegation => "Delegation",
    Remediation => "Remediation",
    ViolationReview => "ViolationReview",
    Form => "Form",
    Event => "Event",
});

str_enum!(WorkItemState {
    Finished => "Finished",
    Rejected => "Rejected",
    Returned => "Returned",
    Expired => "Expired",
    Pending => "Pending",
    Canceled => "Canceled",
});

str_enum!(WorkItemLevel {
    Low => "Low",
    Normal => "Normal",
    High => "High",
});

/// One change of owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerHistory {
    /// Previous owner name.
    pub old_owner: Option<String>,
    /// New owner name.
    pub new_owner: Option<String>,
    /// Who made the change.
    pub changed_by: Option<String>,
    /// Why.
    pub comment: Option<String>,
    /// When.
    pub start_date: DateTime<Utc>,
}

/// A comment left on a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Author name.
    pub author: String,
    /// Comment text.
    pub text: String,
    /// When it was written.
    pub date: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment dated now.
    #[must_use]
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            date: Utc::now(),
        }
    }
}

/// A unit of human work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItem {
    /// Common object fields. The owner is whoever must act.
    pub header: ObjectHeader,

    // === Classification ===
    /// Kind of work.
    pub item_type: WorkItemType,
    /// Completion state; open items have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<WorkItemState>,
    /// Priority.
    pub level: WorkItemLevel,

    // === Participants ===
    /// Who asked for the work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,
    /// Member of a workgroup owner who picked the item up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Reference>,

    // === Target ===
    /// Class of the object the work is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_class: Option<String>,
    /// Id of that object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Name of that object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,

    // === Escalation ===
    /// When the item expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
    /// How many times the item has been escalated.
    pub escalation_count: u32,

    // === History ===
    /// Owner changes, oldest first.
    pub owner_history: Vec<OwnerHistory>,
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
    /// Ids of objects notified when the owner changes.
    pub owner_change_listener_ids: Vec<String>,

    /// Certification this item belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification: Option<String>,

    /// Form and workflow variables.
    pub attributes: Attributes,
}

persistent_object!(WorkItem {
    with_attributes!();

    fn is_name_unique(&self) -> bool {
        false
    }
});

impl WorkItem {
    /// Creates a work item of the given type owned by `owner`.
    #[must_use]
    pub fn new(item_type: WorkItemType, owner: Reference) -> Self {
        let mut item = Self {
            item_type,
            ..Self::default()
        };
        item.header.owner = Some(owner);
        item
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.header.description = Some(description.into());
        self
    }

    /// Sets the target object.
    #[must_use]
    pub fn with_target(mut self, target: &dyn PersistentObject) -> Self {
        self.target_class = Some(target.object_class().as_str().to_string());
        self.target_id = target.id().map(ToString::to_string);
        self.target_name = target.name().map(ToString::to_string);
        self
    }

    /// Returns the current owner's name.
    #[must_use]
    pub fn owner_name(&self) -> Option<&str> {
        self.header.owner.as_ref().and_then(Reference::name)
    }

    /// Whether the item has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.state == Some(WorkItemState::Expired) || self.expiration.is_some_and(|e| e <= now)
    }

    /// Whether the item still needs someone to act on it.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, None | Some(WorkItemState::Pending))
    }

    /// Adds a comment.
    pub fn add_comment(&mut self, author: impl Into<String>, text: impl Into<String>) {
        self.comments.push(Comment::new(author, text));
    }

    /// Changes the owner and records the change.
    pub fn change_owner(&mut self, new_owner: Reference, changed_by: Option<&str>, comment: Option<&str>) {
        let old_owner = self.owner_name().map(ToString::to_string);
        self.owner_history.push(OwnerHistory {
            old_owner,
            new_owner: new_owner.name().map(ToString::to_string),
            changed_by: changed_by.map(ToString::to_string),
            comment: comment.map(ToString::to_string),
            start_date: Utc::now(),
        });
        self.header.owner = Some(new_owner);
        self.assignee = None;
    }

    /// Escalates the item to `target`.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::InvalidEscalationTarget` if the target is
    /// inactive or already owns the item.
    pub fn escalate(&mut self, target: &Identity) -> ModelResult<()> {
        let item = self
            .header
            .id
            .clone()
            .or_else(|| self.header.name.clone())
            .unwrap_or_default();
        let target_name = target.header.name.clone().unwrap_or_default();

        let cause = if target.inactive {
            Some("target is inactive")
        } else if self.header.owner.as_ref().is_some_and(|o| o.refers_to(target)) {
            Some("target already owns the item")
        } else {
            None
        };
        if let Some(cause) = cause {
            return Err(ModelError::InvalidEscalationTarget {
                item,
                target: target_name,
                cause: cause.to_string(),
            });
        }

        self.change_owner(Reference::to(target), None, Some("escalation"));
        self.escalation_count += 1;
        Ok(())
    }

    /// Registers an object to be told about owner changes.
    pub fn add_owner_change_listener(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.owner_change_listener_ids.contains(&id) {
            self.owner_change_listener_ids.push(id);
        }
    }
}

/// A completed work item, detached from live objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItemArchive {
    /// Common object fields.
    pub header: ObjectHeader,
    /// Id of the archived work item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_item_id: Option<String>,
    /// Owner name at completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    /// Requester name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    /// Assignee name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Name of whoever completed the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completer: Option<String>,
    /// Kind of work.
    pub item_type: WorkItemType,
    /// Final state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<WorkItemState>,
    /// Priority.
    pub level: WorkItemLevel,
    /// Target class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_class: Option<String>,
    /// Target id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Target name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// When the archive was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<DateTime<Utc>>,
    /// Copied variables.
    pub attributes: Attributes,
}

persistent_object!(WorkItemArchive {
    with_attributes!();

    fn is_name_unique(&self) -> bool {
        false
    }
});

impl WorkItemArchive {
    /// Archives a work item.
    #[must_use]
    pub fn from_work_item(item: &WorkItem, completer: Option<&str>) -> Self {
        let mut header = ObjectHeader::default();
        header.set_name(item.header.name.clone());
        header.description.clone_from(&item.header.description);
        header.assigned_scope.clone_from(&item.header.assigned_scope);
        header.assigned_scope_path.clone_from(&item.header.assigned_scope_path);

        Self {
            header,
            work_item_id: item.header.id.clone(),
            owner_name: item.owner_name().map(ToString::to_string),
            requester: item.requester.as_ref().map(|r| r.display_name().to_string()),
            assignee: item.assignee.as_ref().map(|r| r.display_name().to_string()),
            completer: completer.map(ToString::to_string),
            item_type: item.item_type,
            state: item.state,
            level: item.level,
            target_class: item.target_class.clone(),
            target_id: item.target_id.clone(),
            target_name: item.target_name.clone(),
            archived: Some(Utc::now()),
            attributes: item.attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::class::ObjectClass;

    fn owner(name: &str) -> Reference {
        Reference::by_name(ObjectClass::Identity, name)
    }

    #[test]
    fn names_are_not_unique() {
        let item = WorkItem::new(WorkItemType::Approval, owner("a"));
        assert!(!item.is_name_unique());
        assert!(item.has_name());
    }

    #[test]
    fn expiration() {
        let now = Utc::now();
        let mut item = WorkItem::new(WorkItemType::Approval, owner("a"));
        assert!(!item.is_expired(now));

        item.expiration = Some(now - Duration::minutes(1));
        assert!(item.is_expired(now));

        item.expiration = Some(now + Duration::minutes(1));
        assert!(!item.is_expired(now));

        item.state = Some(WorkItemState::Expired);
        assert!(item.is_expired(now));
        assert!(!item.is_open());
    }

    #[test]
    fn change_owner_records_history() {
        let mut item = WorkItem::new(WorkItemType::Remediation, owner("alice"));
        item.assignee = Some(owner("carol"));
        item.change_owner(owner("bob"), Some("spadmin"), Some("vacation"));

        assert_eq!(item.owner_name(), Some("bob"));
        assert!(item.assignee.is_none());
        let history = &item.owner_history[0];
        assert_eq!(history.old_owner.as_deref(), Some("alice"));
        assert_eq!(history.new_owner.as_deref(), Some("bob"));
        assert_eq!(history.changed_by.as_deref(), Some("spadmin"));
    }

    #[test]
    fn escalation_rejects_inactive_and_current_owner() {
        let mut item = WorkItem::new(WorkItemType::Approval, owner("alice"));
        item.header.id = Some("wi1".into());

        let mut gone = Identity::new("dave");
        gone.inactive = true;
        let err = item.escalate(&gone).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidEscalationTarget { ref item, ref target, .. }
                if item == "wi1" && target == "dave"
        ));

        let err = item.escalate(&Identity::new("alice")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidEscalationTarget { .. }));
        assert_eq!(item.escalation_count, 0);

        item.escalate(&Identity::new("manager")).unwrap();
        assert_eq!(item.owner_name(), Some("manager"));
        assert_eq!(item.escalation_count, 1);
    }

    #[test]
    fn listeners_are_ids() {
        let mut item = WorkItem::new(WorkItemType::Certification, owner("a"));
        item.add_owner_change_listener("cert-1");
        item.add_owner_change_listener("cert-1");
        assert_eq!(item.owner_change_listener_ids, vec!["cert-1".to_string()]);
    }

    #[test]
    fn archive_flattens_references() {
        let mut item = WorkItem::new(WorkItemType::Approval, owner("alice"))
            .with_description("Approve access");
        item.header.id = Some("wi7".into());
        item.header.name = Some("0000000007".into());
        item.requester = Some(owner("bob"));
        item.state = Some(WorkItemState::Finished);
        item.add_comment("alice", "looks fine");

        let archive = WorkItemArchive::from_work_item(&item, Some("alice"));
        assert_eq!(archive.work_item_id.as_deref(), Some("wi7"));
        assert_eq!(archive.owner_name.as_deref(), Some("alice"));
        assert_eq!(archive.requester.as_deref(), Some("bob"));
        assert_eq!(archive.completer.as_deref(), Some("alice"));
        assert_eq!(archive.state, Some(WorkItemState::Finished));
        assert!(archive.header.id.is_none());
        assert!(!archive.is_name_unique());
    }

    #[test]
    fn enum_names() {
        assert_eq!(WorkItemType::parse("remediation"), Some(WorkItemType::Remediation));
        assert_eq!(WorkItemState::Canceled.as_str(), "Canceled");
        assert_eq!(WorkItemLevel::parse("HIGH"), Some(WorkItemLevel::High));
        assert_eq!(WorkItemLevel::parse("urgent"), None);
    }
}
