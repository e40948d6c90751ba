//! Double dispatch over persistent objects.
//!
//! [`AnyObject::accept`](crate::any::AnyObject::accept) calls the method
//! matching the object's class. Every per-class method defaults to
//! [`Visitor::visit_object`], so a visitor only overrides the classes it
//! cares about.

use async_trait::async_trait;

use crate::application::Application;
use crate::bundle::Bundle;
use crate::certification::Certification;
use crate::identity::Identity;
use crate::link::Link;
use crate::managed_attribute::ManagedAttribute;
use crate::object::PersistentObject;
use crate::policy::{Policy, PolicyViolation};
use crate::rule::Rule;
use crate::scope::Scope;
use crate::server::{Server, ServerStatistic};
use crate::task::{TaskDefinition, TaskResult};
use crate::work_item::{WorkItem, WorkItemArchive};

/// A visitor over persistent objects.
#[async_trait]
pub trait Visitor: Send {
    /// Error reported by the visitor.
    type Error: Send;

    /// Fallback for every class. Does nothing by default.
    ///
    /// ## Errors
    ///
    /// Whatever the visitor reports; the per-class methods below return
    /// this fallback's result unless overridden.
    async fn visit_object(&mut self, _obj: &dyn PersistentObject) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Visits an `Identity`.
    async fn visit_identity(&mut self, obj: &Identity) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits an `Application`.
    async fn visit_application(&mut self, obj: &Application) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `Link`.
    async fn visit_link(&mut self, obj: &Link) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `Bundle`.
    async fn visit_bundle(&mut self, obj: &Bundle) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `ManagedAttribute`.
    async fn visit_managed_attribute(&mut self, obj: &ManagedAttribute) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `WorkItem`.
    async fn visit_work_item(&mut self, obj: &WorkItem) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `WorkItemArchive`.
    async fn visit_work_item_archive(&mut self, obj: &WorkItemArchive) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `Certification`.
    async fn visit_certification(&mut self, obj: &Certification) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `Policy`.
    async fn visit_policy(&mut self, obj: &Policy) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `PolicyViolation`.
    async fn visit_policy_violation(&mut self, obj: &PolicyViolation) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `Scope`.
    async fn visit_scope(&mut self, obj: &Scope) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `Server`.
    async fn visit_server(&mut self, obj: &Server) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `ServerStatistic`.
    async fn visit_server_statistic(&mut self, obj: &ServerStatistic) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `Rule`.
    async fn visit_rule(&mut self, obj: &Rule) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `TaskDefinition`.
    async fn visit_task_definition(&mut self, obj: &TaskDefinition) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }

    /// Visits a `TaskResult`.
    async fn visit_task_result(&mut self, obj: &TaskResult) -> Result<(), Self::Error> {
        self.visit_object(obj).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any::AnyObject;
    use crate::class::ObjectClass;

    #[derive(Default)]
    struct Recorder {
        generic: Vec<ObjectClass>,
        identities: Vec<String>,
    }

    #[async_trait]
    impl Visitor for Recorder {
        type Error = std::convert::Infallible;

        async fn visit_object(&mut self, obj: &dyn PersistentObject) -> Result<(), Self::Error> {
            self.generic.push(obj.object_class());
            Ok(())
        }

        async fn visit_identity(&mut self, obj: &Identity) -> Result<(), Self::Error> {
            self.identities.push(obj.header.name.clone().unwrap_or_default());
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatches_to_specific_method_or_fallback() {
        let objects: Vec<AnyObject> = vec![
            Identity::new("jsmith").into(),
            Bundle::new("Employee").into(),
            Rule::new("Select", "AccountSelector").into(),
        ];

        let mut recorder = Recorder::default();
        for obj in &objects {
            obj.accept(&mut recorder).await.unwrap();
        }

        assert_eq!(recorder.identities, vec!["jsmith"]);
        assert_eq!(recorder.generic, vec![ObjectClass::Bundle, ObjectClass::Rule]);
    }

    struct Refuse;

    #[async_trait]
    impl Visitor for Refuse {
        type Error = String;

        async fn visit_link(&mut self, obj: &Link) -> Result<(), String> {
            Err(format!("refusing {:?}", obj.native_identity))
        }
    }

    #[tokio::test]
    async fn errors_propagate() {
        let link: AnyObject = Link::new("uid=jsmith").into();
        let err = link.accept(&mut Refuse).await.unwrap_err();
        assert!(err.contains("uid=jsmith"));

        let scope: AnyObject = Scope::new("Austin").into();
        assert!(scope.accept(&mut Refuse).await.is_ok());
    }
}
