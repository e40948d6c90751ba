//! Element mapping for each entity.
//!
//! Every entity is written as an element named after its class. Header
//! fields come first (see [`ElementWriter::header`]); the fields below
//! follow in declaration order.

use ig_model::application::{Application, ApplicationAccountSelectorRule};
use ig_model::certification::{
    Certification, CertificationStatistics, DecisionCategory, DecisionCounts,
};
use ig_model::config_objects::{AttributeAssignment, CorrelationCondition, CorrelationConfig};
use ig_model::identity::{Identity, RoleMetadata};
use ig_model::policy::{Policy, PolicyViolation, SodConstraint};
use ig_model::task::{MessageLevel, TaskDefinition, TaskMessage, TaskResult};
use ig_model::work_item::{Comment, OwnerHistory, WorkItem, WorkItemArchive};
use ig_model::{
    Bundle, Entity, Link, ManagedAttribute, Rule, Scope, Server, ServerStatistic,
};

use crate::codec::XmlOptions;
use crate::dom::Element;
use crate::error::{XmlError, XmlResult};
use crate::value::{format_date, parse_date, ElementWriter};

/// An entity with an XML mapping.
pub trait XmlEntity: Entity + Default {
    /// Writes the entity's own fields after the header.
    fn write_fields(&self, w: &mut ElementWriter<'_>);

    /// Reads the entity's own fields. The header is filled in by the
    /// caller.
    ///
    /// ## Errors
    ///
    /// Returns an error if a field is malformed.
    fn read_fields(el: &Element) -> XmlResult<Self>;
}

/// Encodes an entity as its class element.
#[must_use]
pub fn encode_entity<T: XmlEntity>(object: &T, options: &XmlOptions) -> Element {
    let mut writer = ElementWriter::new(T::CLASS.as_str(), options);
    writer.header(object.header());
    object.write_fields(&mut writer);
    writer.finish()
}

/// Decodes an entity from its class element.
///
/// ## Errors
///
/// Returns an error if the element is for another class or a field is
/// malformed.
pub fn decode_entity<T: XmlEntity>(element: &Element) -> XmlResult<T> {
    element.expect_name(T::CLASS.as_str())?;
    let mut object = T::read_fields(element)?;
    *object.header_mut() = element.header()?;
    Ok(object)
}

fn required_reference(el: &Element, wrapper: &str) -> XmlResult<ig_model::Reference> {
    el.reference_in(wrapper)?
        .ok_or_else(|| XmlError::malformed(format!("<{}> is missing <{wrapper}>", el.name)))
}

// ============================================================================
// Identity
// ============================================================================

impl XmlEntity for Identity {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("firstname", self.firstname.as_deref())
            .attr("lastname", self.lastname.as_deref())
            .attr("displayName", self.display_name.as_deref())
            .attr("email", self.email.as_deref())
            .flag("workgroup", self.workgroup)
            .flag("inactive", self.inactive)
            .flag("correlated", self.correlated)
            .date("lastLogin", self.last_login)
            .date("lastRefresh", self.last_refresh)
            .reference("Manager", self.manager.as_ref())
            .references("AssignedRoles", &self.assigned_roles)
            .references("DetectedRoles", &self.detected_roles);

        if !self.role_metadatas.is_empty() {
            let mut list = Element::new("RoleMetadatas");
            for metadata in &self.role_metadatas {
                let mut writer = ElementWriter::new("RoleMetadata", w.options());
                writer
                    .flag("assigned", metadata.assigned)
                    .flag("detected", metadata.detected)
                    .flag("additionalEntitlements", metadata.additional_entitlements)
                    .flag("missingRequired", metadata.missing_required)
                    .reference("Role", Some(&metadata.role));
                list.children.push(writer.finish());
            }
            w.child(list);
        }

        w.references("Links", &self.links)
            .strings("Capabilities", &self.capabilities)
            .references("ControlledScopes", &self.controlled_scopes)
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        let role_metadatas = el
            .child("RoleMetadatas")
            .map(|list| {
                list.children_named("RoleMetadata")
                    .map(|m| {
                        let mut metadata = RoleMetadata::new(required_reference(m, "Role")?);
                        metadata.assigned = m.flag("assigned");
                        metadata.detected = m.flag("detected");
                        metadata.additional_entitlements = m.flag("additionalEntitlements");
                        metadata.missing_required = m.flag("missingRequired");
                        Ok(metadata)
                    })
                    .collect::<XmlResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            firstname: el.string_attr("firstname"),
            lastname: el.string_attr("lastname"),
            display_name: el.string_attr("displayName"),
            email: el.string_attr("email"),
            manager: el.reference_in("Manager")?,
            workgroup: el.flag("workgroup"),
            inactive: el.flag("inactive"),
            correlated: el.flag("correlated"),
            assigned_roles: el.references_in("AssignedRoles")?,
            detected_roles: el.references_in("DetectedRoles")?,
            role_metadatas,
            links: el.references_in("Links")?,
            capabilities: el.strings_in("Capabilities"),
            controlled_scopes: el.references_in("ControlledScopes")?,
            last_login: el.date_attr("lastLogin")?,
            last_refresh: el.date_attr("lastRefresh")?,
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

// ============================================================================
// Application
// ============================================================================

fn encode_correlation(config: &CorrelationConfig) -> Element {
    let mut element = Element::new("CorrelationConfig");
    if let Some(name) = &config.name {
        element.set_attr("name", name.as_str());
    }
    if !config.attribute_assignments.is_empty() {
        let mut list = Element::new("AttributeAssignments");
        list.children = config
            .attribute_assignments
            .iter()
            .map(|a| {
                Element::new("AttributeAssignment")
                    .with_attr("identityAttribute", a.identity_attribute.as_str())
                    .with_attr("accountAttribute", a.account_attribute.as_str())
            })
            .collect();
        element.children.push(list);
    }
    if !config.conditions.is_empty() {
        let mut list = Element::new("Conditions");
        list.children = config
            .conditions
            .iter()
            .map(|c| {
                Element::new("Condition")
                    .with_attr("attribute", c.attribute.as_str())
                    .with_attr("value", c.value.as_str())
            })
            .collect();
        element.children.push(list);
    }
    element
}

fn decode_correlation(el: &Element) -> CorrelationConfig {
    let attribute_assignments = el
        .child("AttributeAssignments")
        .map(|list| {
            list.children_named("AttributeAssignment")
                .map(|a| AttributeAssignment {
                    identity_attribute: a.attr("identityAttribute").unwrap_or_default().to_string(),
                    account_attribute: a.attr("accountAttribute").unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    let conditions = el
        .child("Conditions")
        .map(|list| {
            list.children_named("Condition")
                .map(|c| CorrelationCondition {
                    attribute: c.attr("attribute").unwrap_or_default().to_string(),
                    value: c.attr("value").unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    CorrelationConfig {
        name: el.string_attr("name"),
        attribute_assignments,
        conditions,
    }
}

impl XmlEntity for Application {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("connector", self.connector.as_deref())
            .attr("type", self.app_type.as_deref())
            .attr("featuresString", self.features_string().as_deref())
            .flag("authoritative", self.authoritative)
            .reference("ProxiedApplication", self.proxy.as_ref());

        if let Some(config) = &self.account_correlation_config {
            w.child(Element::new("AccountCorrelationConfig").with_child(encode_correlation(config)));
        }

        w.references("Remediators", &self.remediators)
            .references("Dependencies", &self.dependencies);

        if !self.account_selector_rules.is_empty() {
            let mut list = Element::new("AccountSelectorRules");
            for selector in &self.account_selector_rules {
                let mut writer = ElementWriter::new("ApplicationAccountSelectorRule", w.options());
                writer
                    .reference("ApplicationRef", Some(&selector.application))
                    .reference("RuleRef", Some(&selector.rule));
                list.children.push(writer.finish());
            }
            w.child(list);
        }

        w.attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        let account_selector_rules = el
            .child("AccountSelectorRules")
            .map(|list| {
                list.children_named("ApplicationAccountSelectorRule")
                    .map(|s| {
                        Ok(ApplicationAccountSelectorRule::new(
                            required_reference(s, "ApplicationRef")?,
                            required_reference(s, "RuleRef")?,
                        ))
                    })
                    .collect::<XmlResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let mut app = Self {
            connector: el.string_attr("connector"),
            app_type: el.string_attr("type"),
            proxy: el.reference_in("ProxiedApplication")?,
            authoritative: el.flag("authoritative"),
            account_correlation_config: el
                .child("AccountCorrelationConfig")
                .and_then(|w| w.child("CorrelationConfig"))
                .map(decode_correlation),
            remediators: el.references_in("Remediators")?,
            dependencies: el.references_in("Dependencies")?,
            account_selector_rules,
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        };
        if let Some(features) = el.attr("featuresString") {
            app.set_features_string(features)?;
        }
        Ok(app)
    }
}

// ============================================================================
// Link
// ============================================================================

impl XmlEntity for Link {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("instance", self.instance.as_deref())
            .attr("nativeIdentity", self.native_identity.as_deref())
            .attr("displayName", self.display_name.as_deref())
            .attr("uuid", self.uuid.as_deref())
            .flag("entitlements", self.entitlements)
            .flag("manuallyCorrelated", self.manually_correlated)
            .date("lastRefresh", self.last_refresh)
            .reference("IdentityRef", self.identity.as_ref())
            .reference("ApplicationRef", self.application.as_ref())
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            identity: el.reference_in("IdentityRef")?,
            application: el.reference_in("ApplicationRef")?,
            instance: el.string_attr("instance"),
            native_identity: el.string_attr("nativeIdentity"),
            display_name: el.string_attr("displayName"),
            uuid: el.string_attr("uuid"),
            entitlements: el.flag("entitlements"),
            manually_correlated: el.flag("manuallyCorrelated"),
            last_refresh: el.date_attr("lastRefresh")?,
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

// ============================================================================
// Bundle
// ============================================================================

impl XmlEntity for Bundle {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("type", self.role_type.as_deref())
            .attr("displayName", self.display_name.as_deref())
            .date("activationDate", self.activation_date)
            .date("deactivationDate", self.deactivation_date)
            .number("riskScoreWeight", self.risk_score_weight)
            .references("Inheritance", &self.inheritance)
            .references("Permits", &self.permits)
            .references("Requirements", &self.requirements)
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            role_type: el.string_attr("type"),
            display_name: el.string_attr("displayName"),
            inheritance: el.references_in("Inheritance")?,
            permits: el.references_in("Permits")?,
            requirements: el.references_in("Requirements")?,
            activation_date: el.date_attr("activationDate")?,
            deactivation_date: el.date_attr("deactivationDate")?,
            risk_score_weight: el.number("riskScoreWeight")?,
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

// ============================================================================
// ManagedAttribute
// ============================================================================

impl XmlEntity for ManagedAttribute {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.enumeration("type", Some(self.attr_type))
            .attr("attribute", self.attribute.as_deref())
            .attr("value", self.value.as_deref())
            .attr("displayName", self.display_name.as_deref())
            .flag("requestable", self.requestable)
            .reference("ApplicationRef", self.application.as_ref())
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            application: el.reference_in("ApplicationRef")?,
            attr_type: el.enum_attr("type")?.unwrap_or_default(),
            attribute: el.string_attr("attribute"),
            value: el.string_attr("value"),
            display_name: el.string_attr("displayName"),
            requestable: el.flag("requestable"),
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

// ============================================================================
// WorkItem and WorkItemArchive
// ============================================================================

impl XmlEntity for WorkItem {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.enumeration("type", Some(self.item_type))
            .enumeration("state", self.state)
            .enumeration("level", Some(self.level))
            .attr("targetClass", self.target_class.as_deref())
            .attr("targetId", self.target_id.as_deref())
            .attr("targetName", self.target_name.as_deref())
            .date("expiration", self.expiration)
            .number("escalationCount", self.escalation_count)
            .attr("certification", self.certification.as_deref())
            .reference("Requester", self.requester.as_ref())
            .reference("Assignee", self.assignee.as_ref());

        if !self.owner_history.is_empty() {
            let mut list = Element::new("OwnerHistory");
            for entry in &self.owner_history {
                let mut writer = ElementWriter::new("OwnerHistoryEntry", w.options());
                writer
                    .attr("oldOwner", entry.old_owner.as_deref())
                    .attr("newOwner", entry.new_owner.as_deref())
                    .attr("changedBy", entry.changed_by.as_deref())
                    .attr("comment", entry.comment.as_deref())
                    .date("startDate", Some(entry.start_date));
                list.children.push(writer.finish());
            }
            w.child(list);
        }

        if !self.comments.is_empty() {
            let mut list = Element::new("Comments");
            list.children = self
                .comments
                .iter()
                .map(|c| {
                    Element::new("Comment")
                        .with_attr("author", c.author.as_str())
                        .with_attr("date", format_date(c.date))
                        .with_text(c.text.as_str())
                })
                .collect();
            w.child(list);
        }

        w.strings("OwnerChangeListeners", &self.owner_change_listener_ids)
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        let owner_history = el
            .child("OwnerHistory")
            .map(|list| {
                list.children_named("OwnerHistoryEntry")
                    .map(|h| {
                        let start = h.attr("startDate").unwrap_or_default();
                        Ok(OwnerHistory {
                            old_owner: h.string_attr("oldOwner"),
                            new_owner: h.string_attr("newOwner"),
                            changed_by: h.string_attr("changedBy"),
                            comment: h.string_attr("comment"),
                            start_date: parse_date("startDate", start)?,
                        })
                    })
                    .collect::<XmlResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let comments = el
            .child("Comments")
            .map(|list| {
                list.children_named("Comment")
                    .map(|c| {
                        Ok(Comment {
                            author: c.attr("author").unwrap_or_default().to_string(),
                            text: c.text().unwrap_or_default().to_string(),
                            date: parse_date("date", c.attr("date").unwrap_or_default())?,
                        })
                    })
                    .collect::<XmlResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            item_type: el.enum_attr("type")?.unwrap_or_default(),
            state: el.enum_attr("state")?,
            level: el.enum_attr("level")?.unwrap_or_default(),
            requester: el.reference_in("Requester")?,
            assignee: el.reference_in("Assignee")?,
            target_class: el.string_attr("targetClass"),
            target_id: el.string_attr("targetId"),
            target_name: el.string_attr("targetName"),
            expiration: el.date_attr("expiration")?,
            escalation_count: el.number("escalationCount")?,
            owner_history,
            comments,
            owner_change_listener_ids: el.strings_in("OwnerChangeListeners"),
            certification: el.string_attr("certification"),
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

impl XmlEntity for WorkItemArchive {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("workItemId", self.work_item_id.as_deref())
            .attr("ownerName", self.owner_name.as_deref())
            .attr("requester", self.requester.as_deref())
            .attr("assignee", self.assignee.as_deref())
            .attr("completer", self.completer.as_deref())
            .enumeration("type", Some(self.item_type))
            .enumeration("state", self.state)
            .enumeration("level", Some(self.level))
            .attr("targetClass", self.target_class.as_deref())
            .attr("targetId", self.target_id.as_deref())
            .attr("targetName", self.target_name.as_deref())
            .date("archived", self.archived)
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            work_item_id: el.string_attr("workItemId"),
            owner_name: el.string_attr("ownerName"),
            requester: el.string_attr("requester"),
            assignee: el.string_attr("assignee"),
            completer: el.string_attr("completer"),
            item_type: el.enum_attr("type")?.unwrap_or_default(),
            state: el.enum_attr("state")?,
            level: el.enum_attr("level")?.unwrap_or_default(),
            target_class: el.string_attr("targetClass"),
            target_id: el.string_attr("targetId"),
            target_name: el.string_attr("targetName"),
            archived: el.date_attr("archived")?,
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

// ============================================================================
// Certification
// ============================================================================

fn encode_statistics(stats: &CertificationStatistics, options: &XmlOptions) -> Element {
    let mut w = ElementWriter::new("CertificationStatistics", options);
    w.number("totalEntities", stats.total_entities)
        .number("excludedEntities", stats.excluded_entities)
        .number("completedEntities", stats.completed_entities)
        .number("delegatedEntities", stats.delegated_entities)
        .number("percentComplete", stats.percent_complete)
        .number("certifiedEntities", stats.certified_entities)
        .number("certificationRequiredEntities", stats.certification_required_entities)
        .number("overdueEntities", stats.overdue_entities)
        .number("totalItems", stats.total_items)
        .number("excludedItems", stats.excluded_items)
        .number("completedItems", stats.completed_items)
        .number("delegatedItems", stats.delegated_items)
        .number("itemPercentComplete", stats.item_percent_complete)
        .number("certifiedItems", stats.certified_items)
        .number("certificationRequiredItems", stats.certification_required_items)
        .number("overdueItems", stats.overdue_items)
        .number("remediationsKickedOff", stats.remediations_kicked_off)
        .number("remediationsCompleted", stats.remediations_completed);

    for (category, counts) in &stats.decisions {
        let mut decision = ElementWriter::new("DecisionCounts", options);
        decision
            .attr("category", Some(category.as_str()))
            .number("total", counts.total)
            .number("approved", counts.approved)
            .number("allowed", counts.allowed)
            .number("remediated", counts.remediated)
            .number("acknowledged", counts.acknowledged);
        w.child(decision.finish());
    }
    w.finish()
}

fn decode_statistics(el: &Element) -> XmlResult<CertificationStatistics> {
    let mut stats = CertificationStatistics {
        total_entities: el.number("totalEntities")?,
        excluded_entities: el.number("excludedEntities")?,
        completed_entities: el.number("completedEntities")?,
        delegated_entities: el.number("delegatedEntities")?,
        percent_complete: el.number("percentComplete")?,
        certified_entities: el.number("certifiedEntities")?,
        certification_required_entities: el.number("certificationRequiredEntities")?,
        overdue_entities: el.number("overdueEntities")?,
        total_items: el.number("totalItems")?,
        excluded_items: el.number("excludedItems")?,
        completed_items: el.number("completedItems")?,
        delegated_items: el.number("delegatedItems")?,
        item_percent_complete: el.number("itemPercentComplete")?,
        certified_items: el.number("certifiedItems")?,
        certification_required_items: el.number("certificationRequiredItems")?,
        overdue_items: el.number("overdueItems")?,
        remediations_kicked_off: el.number("remediationsKickedOff")?,
        remediations_completed: el.number("remediationsCompleted")?,
        ..CertificationStatistics::default()
    };
    for decision in el.children_named("DecisionCounts") {
        let name = decision.attr("category").unwrap_or_default();
        let category = DecisionCategory::parse(name)
            .ok_or_else(|| XmlError::invalid_value("category", name))?;
        let counts = DecisionCounts {
            total: decision.number("total")?,
            approved: decision.number("approved")?,
            allowed: decision.number("allowed")?,
            remediated: decision.number("remediated")?,
            acknowledged: decision.number("acknowledged")?,
        };
        stats.decisions.insert(category, counts);
    }
    Ok(stats)
}

impl XmlEntity for Certification {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("shortName", self.short_name.as_deref())
            .attr("creator", self.creator.as_deref())
            .enumeration("type", Some(self.cert_type))
            .enumeration("phase", self.phase)
            .date("signed", self.signed)
            .date("finished", self.finished)
            .date("expiration", self.expiration)
            .flag("selfCertificationReassignment", self.self_certification_reassignment)
            .flag("allowSelfCertification", self.allow_self_certification)
            .flag("limitReassignments", self.limit_reassignments)
            .number("reassignmentLimit", self.reassignment_limit)
            .number("reassignmentCount", self.reassignment_count)
            .strings("Certifiers", &self.certifiers);

        let stats = encode_statistics(&self.statistics, w.options());
        if !stats.is_empty() {
            w.child(stats);
        }

        w.strings("WorkItems", &self.work_items)
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            short_name: el.string_attr("shortName"),
            creator: el.string_attr("creator"),
            certifiers: el.strings_in("Certifiers"),
            cert_type: el.enum_attr("type")?.unwrap_or_default(),
            phase: el.enum_attr("phase")?,
            signed: el.date_attr("signed")?,
            finished: el.date_attr("finished")?,
            expiration: el.date_attr("expiration")?,
            statistics: el
                .child("CertificationStatistics")
                .map(decode_statistics)
                .transpose()?
                .unwrap_or_default(),
            self_certification_reassignment: el.flag("selfCertificationReassignment"),
            allow_self_certification: el.flag("allowSelfCertification"),
            limit_reassignments: el.flag("limitReassignments"),
            reassignment_limit: el.number("reassignmentLimit")?,
            reassignment_count: el.number("reassignmentCount")?,
            work_items: el.strings_in("WorkItems"),
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

// ============================================================================
// Policy and PolicyViolation
// ============================================================================

impl XmlEntity for Policy {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("type", self.policy_type.as_deref())
            .attr("executor", self.executor.as_deref())
            .enumeration("state", Some(self.state))
            .flag("template", self.template)
            .reference("ViolationOwner", self.violation_owner.as_ref());

        if !self.sod_constraints.is_empty() {
            let mut list = Element::new("SODConstraints");
            for constraint in &self.sod_constraints {
                let mut writer = ElementWriter::new("SODConstraint", w.options());
                writer
                    .attr("id", constraint.id.as_deref())
                    .attr("name", constraint.name.as_deref())
                    .flag("disabled", constraint.disabled)
                    .text("Description", constraint.description.as_deref())
                    .references("LeftBundles", &constraint.left_bundles)
                    .references("RightBundles", &constraint.right_bundles);
                list.children.push(writer.finish());
            }
            w.child(list);
        }

        w.attributes("Attributes", &self.arguments);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        let sod_constraints = el
            .child("SODConstraints")
            .map(|list| {
                list.children_named("SODConstraint")
                    .map(|c| {
                        Ok(SodConstraint {
                            id: c.string_attr("id"),
                            name: c.string_attr("name"),
                            description: c.child_text("Description"),
                            disabled: c.flag("disabled"),
                            left_bundles: c.references_in("LeftBundles")?,
                            right_bundles: c.references_in("RightBundles")?,
                        })
                    })
                    .collect::<XmlResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            policy_type: el.string_attr("type"),
            executor: el.string_attr("executor"),
            state: el.enum_attr("state")?.unwrap_or_default(),
            template: el.flag("template"),
            violation_owner: el.reference_in("ViolationOwner")?,
            sod_constraints,
            arguments: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

impl XmlEntity for PolicyViolation {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.flag("active", self.active)
            .enumeration("status", Some(self.status))
            .attr("policyId", self.policy_id.as_deref())
            .attr("policyName", self.policy_name.as_deref())
            .attr("constraintId", self.constraint_id.as_deref())
            .attr("constraintName", self.constraint_name.as_deref())
            .attr("leftBundles", self.left_bundles.as_deref())
            .attr("rightBundles", self.right_bundles.as_deref())
            .attr("bundlesMarkedForRemediation", self.bundles_marked_for_remediation.as_deref())
            .attr("mitigator", self.mitigator.as_deref())
            .flag("alertable", self.alertable)
            .reference("IdentityRef", self.identity.as_ref())
            .attributes("Attributes", &self.arguments);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            identity: el.reference_in("IdentityRef")?,
            active: el.flag("active"),
            status: el.enum_attr("status")?.unwrap_or_default(),
            policy_id: el.string_attr("policyId"),
            policy_name: el.string_attr("policyName"),
            constraint_id: el.string_attr("constraintId"),
            constraint_name: el.string_attr("constraintName"),
            left_bundles: el.string_attr("leftBundles"),
            right_bundles: el.string_attr("rightBundles"),
            bundles_marked_for_remediation: el.string_attr("bundlesMarkedForRemediation"),
            mitigator: el.string_attr("mitigator"),
            alertable: el.flag("alertable"),
            arguments: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

// ============================================================================
// Scope, Server, ServerStatistic
// ============================================================================

impl XmlEntity for Scope {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("displayName", self.display_name.as_deref())
            .attr("path", self.path.as_deref())
            .flag("dormant", self.dormant)
            .reference("Parent", self.parent.as_ref());
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            display_name: el.string_attr("displayName"),
            parent: el.reference_in("Parent")?,
            path: el.string_attr("path"),
            dormant: el.flag("dormant"),
            ..Self::default()
        })
    }
}

impl XmlEntity for Server {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.date("heartbeat", self.heartbeat)
            .flag("inactive", self.inactive)
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            heartbeat: el.date_attr("heartbeat")?,
            inactive: el.flag("inactive"),
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

impl XmlEntity for ServerStatistic {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("snapshotName", self.snapshot_name.as_deref())
            .attr("value", self.value.as_deref())
            .attr("valueType", self.value_type.as_deref())
            .attr("target", self.target.as_deref())
            .attr("targetType", self.target_type.as_deref())
            .reference("Host", self.host.as_ref())
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            host: el.reference_in("Host")?,
            snapshot_name: el.string_attr("snapshotName"),
            value: el.string_attr("value"),
            value_type: el.string_attr("valueType"),
            target: el.string_attr("target"),
            target_type: el.string_attr("targetType"),
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

// ============================================================================
// Rule, TaskDefinition, TaskResult
// ============================================================================

impl XmlEntity for Rule {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("language", self.language.as_deref())
            .attr("type", self.rule_type.as_deref())
            .text("Source", self.source.as_deref())
            .references("ReferencedRules", &self.referenced_rules)
            .attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            language: el.string_attr("language"),
            rule_type: el.string_attr("type"),
            source: el.child_text("Source"),
            referenced_rules: el.references_in("ReferencedRules")?,
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

impl XmlEntity for TaskDefinition {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("executor", self.executor.as_deref())
            .attr("type", self.task_type.as_deref())
            .attributes("Attributes", &self.arguments);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        Ok(Self {
            executor: el.string_attr("executor"),
            task_type: el.string_attr("type"),
            arguments: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}

impl XmlEntity for TaskResult {
    fn write_fields(&self, w: &mut ElementWriter<'_>) {
        w.attr("launcher", self.launcher.as_deref())
            .date("launched", self.launched)
            .date("completed", self.completed)
            .enumeration("completionStatus", self.completion_status)
            .flag("terminated", self.terminated)
            .reference("Definition", self.definition.as_ref());

        if !self.messages.is_empty() {
            let mut list = Element::new("Messages");
            list.children = self
                .messages
                .iter()
                .map(|m| {
                    Element::new("Message")
                        .with_attr("type", m.level.as_str())
                        .with_text(m.text.as_str())
                })
                .collect();
            w.child(list);
        }

        w.attributes("Attributes", &self.attributes);
    }

    fn read_fields(el: &Element) -> XmlResult<Self> {
        let messages = el
            .child("Messages")
            .map(|list| {
                list.children_named("Message")
                    .map(|m| {
                        let level = m.attr("type").unwrap_or("Info");
                        Ok(TaskMessage {
                            level: MessageLevel::parse(level)
                                .ok_or_else(|| XmlError::invalid_value("type", level))?,
                            text: m.text().unwrap_or_default().to_string(),
                        })
                    })
                    .collect::<XmlResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            definition: el.reference_in("Definition")?,
            launcher: el.string_attr("launcher"),
            launched: el.date_attr("launched")?,
            completed: el.date_attr("completed")?,
            completion_status: el.enum_attr("completionStatus")?,
            terminated: el.flag("terminated"),
            messages,
            attributes: el.attributes_in("Attributes")?,
            ..Self::default()
        })
    }
}
