//! A closed sum over every entity type.
//!
//! Stores, the XML codec and the CLI handle objects of mixed classes as
//! [`AnyObject`]; typed code converts with `From`/`TryFrom` or through
//! [`AnyObject::downcast`].

use serde::{Deserialize, Serialize};

use crate::application::Application;
use crate::bundle::Bundle;
use crate::certification::Certification;
use crate::class::ObjectClass;
use crate::error::{ModelError, ModelResult};
use crate::identity::Identity;
use crate::link::Link;
use crate::managed_attribute::ManagedAttribute;
use crate::object::{Entity, PersistentObject};
use crate::policy::{Policy, PolicyViolation};
use crate::rule::Rule;
use crate::scope::Scope;
use crate::server::{Server, ServerStatistic};
use crate::task::{TaskDefinition, TaskResult};
use crate::visitor::Visitor;
use crate::work_item::{WorkItem, WorkItemArchive};

macro_rules! any_object {
    ($($variant:ident => $visit:ident),* $(,)?) => {
        /// Any persistent object.
        ///
        /// Serialized with the class name as a tag:
        /// `{"class": "Identity", "object": {...}}`.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "class", content = "object")]
        #[allow(missing_docs)]
        pub enum AnyObject {
            $($variant($variant),)*
        }

        impl AnyObject {
            /// Returns the object class.
            #[must_use]
            pub const fn object_class(&self) -> ObjectClass {
                match self {
                    $(Self::$variant(_) => ObjectClass::$variant,)*
                }
            }

            /// Borrows the object through the common trait.
            #[must_use]
            pub fn as_persistent(&self) -> &dyn PersistentObject {
                match self {
                    $(Self::$variant(obj) => obj,)*
                }
            }

            /// Borrows the object mutably through the common trait.
            pub fn as_persistent_mut(&mut self) -> &mut dyn PersistentObject {
                match self {
                    $(Self::$variant(obj) => obj,)*
                }
            }

            /// Creates an empty object of the given class.
            #[must_use]
            pub fn empty(class: ObjectClass) -> Self {
                match class {
                    $(ObjectClass::$variant => Self::$variant($variant::default()),)*
                }
            }

            /// Calls the visitor method matching this object's class.
            ///
            /// ## Errors
            ///
            /// Returns whatever the visitor returns.
            pub async fn accept<V>(&self, visitor: &mut V) -> Result<(), V::Error>
            where
                V: Visitor + ?Sized,
            {
                match self {
                    $(Self::$variant(obj) => visitor.$visit(obj).await,)*
                }
            }
        }

        $(
            impl From<$variant> for AnyObject {
                fn from(obj: $variant) -> Self {
                    Self::$variant(obj)
                }
            }

            impl TryFrom<AnyObject> for $variant {
                type Error = ModelError;

                fn try_from(obj: AnyObject) -> Result<Self, Self::Error> {
                    match obj {
                        AnyObject::$variant(inner) => Ok(inner),
                        other => Err(ModelError::ClassMismatch {
                            expected: ObjectClass::$variant.to_string(),
                            found: other.object_class().to_string(),
                        }),
                    }
                }
            }
        )*
    };
}

any_object!(
    Identity => visit_identity,
    Application => visit_application,
    Link => visit_link,
    Bundle => visit_bundle,
    ManagedAttribute => visit_managed_attribute,
    WorkItem => visit_work_item,
    WorkItemArchive => visit_work_item_archive,
    Certification => visit_certification,
    Policy => visit_policy,
    PolicyViolation => visit_policy_violation,
    Scope => visit_scope,
    Server => visit_server,
    ServerStatistic => visit_server_statistic,
    Rule => visit_rule,
    TaskDefinition => visit_task_definition,
    TaskResult => visit_task_result,
);

impl AnyObject {
    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.as_persistent().id()
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.as_persistent().name()
    }

    /// Converts into a concrete entity type.
    ///
    /// ## Errors
    ///
    /// Returns [`ModelError::ClassMismatch`] if the object is of another class.
    pub fn downcast<T: Entity>(self) -> ModelResult<T> {
        T::try_from(self)
    }
}

impl std::fmt::Display for AnyObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let obj = self.as_persistent();
        let label = obj.name().or_else(|| obj.id()).unwrap_or("<unsaved>");
        write!(f, "{}:{}", self.object_class(), label)
    }
}
