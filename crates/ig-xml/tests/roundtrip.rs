//! Round-trip tests for fully populated objects.

use chrono::{DateTime, Utc};
use ig_model::application::{ApplicationAccountSelectorRule, Feature};
use ig_model::certification::{CertificationPhase, CertificationType, DecisionCategory, DecisionCounts};
use ig_model::task::{CompletionStatus, TaskDefinition, TaskResult};
use ig_model::work_item::{Comment, OwnerHistory, WorkItemLevel, WorkItemState, WorkItemType};
use ig_model::{
    AnyObject, Application, AttrValue, Attributes, Bundle, Certification, CorrelationConfig, Identity,
    Link, ManagedAttribute, ObjectClass, PersistentObject, Policy, PolicyViolation, Reference,
    RoleMetadata, Rule, Scope, Server, ServerStatistic, SodConstraint, WorkItem, WorkItemArchive,
};
use ig_xml::{parse_objects, Element, XmlCodec, XmlOptions};

fn at(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

fn identity_ref(name: &str) -> Reference {
    Reference::new(ObjectClass::Identity, Some(format!("id-{name}")), Some(name.to_string()))
}

fn role_ref(name: &str) -> Reference {
    Reference::by_name(ObjectClass::Bundle, name)
}

fn rich_attributes() -> Attributes {
    let mut nested = std::collections::BTreeMap::new();
    nested.insert("cost".to_string(), AttrValue::Float(12.5));
    nested.insert("region".to_string(), AttrValue::from("EMEA"));

    let mut attrs = Attributes::new();
    attrs.put("department", "Finance");
    attrs.put("empty", "");
    attrs.put("active", true);
    attrs.put("level", 7);
    attrs.put("employeeNumber", 90_000_000_001_i64);
    attrs.put("hired", at(1_500_000_000_250));
    attrs.put("groups", vec!["Admins".to_string(), "Auditors".to_string()]);
    attrs.put("budget", AttrValue::Map(nested));
    attrs.put("buddy", identity_ref("carol"));
    attrs
}

fn round_trip(object: AnyObject) {
    for options in [
        XmlOptions::default(),
        XmlOptions {
            indent: 0,
            qualified_class_names: false,
        },
    ] {
        let codec = XmlCodec::new().with_options(options);
        let xml = codec.to_xml(&object).unwrap();
        let decoded = codec.from_xml(&xml).unwrap();
        assert_eq!(decoded, object, "round trip of {object} through:\n{xml}");
    }
}

#[test]
fn identity_round_trip() {
    let mut identity = Identity::new("alice")
        .with_firstname("Alice")
        .with_lastname("Smith")
        .with_email("alice@example.com")
        .with_manager(identity_ref("bob"));
    identity.header_mut().id = Some("id-alice".to_string());
    identity.header_mut().description = Some("Finance analyst & approver".to_string());
    identity.header_mut().created = Some(at(1_600_000_000_000));
    identity.header_mut().modified = Some(at(1_600_000_500_000));
    identity.header_mut().assigned_scope = Some(Reference::by_name(ObjectClass::Scope, "Finance"));
    identity.header_mut().assigned_scope_path = Some("Corp:Finance".to_string());
    identity.display_name = Some("Alice Smith".to_string());
    identity.correlated = true;
    identity.assigned_roles = vec![role_ref("Auditor")];
    identity.detected_roles = vec![role_ref("Finance Users")];
    let mut metadata = RoleMetadata::new(role_ref("Auditor"));
    metadata.assigned = true;
    metadata.missing_required = true;
    identity.role_metadatas = vec![metadata];
    identity.links = vec![Reference::by_id(ObjectClass::Link, "link-1")];
    identity.capabilities = vec!["SystemAdministrator".to_string()];
    identity.controlled_scopes = vec![Reference::by_name(ObjectClass::Scope, "Finance")];
    identity.last_login = Some(at(1_700_000_000_123));
    identity.attributes = rich_attributes();

    round_trip(identity.into());
}

#[test]
fn application_round_trip() {
    let mut app = Application::new("Active Directory")
        .with_connector("sailpoint.connector.ADLDAPConnector")
        .with_type("Active Directory - Direct")
        .with_feature(Feature::Provisioning)
        .with_feature(Feature::Password);
    app.authoritative = true;
    app.proxy = Some(Reference::by_name(ObjectClass::Application, "AD Proxy"));
    app.account_correlation_config = Some(
        CorrelationConfig::default()
            .with_assignment("email", "mail")
            .with_condition("objectClass", "user"),
    );
    app.remediators = vec![identity_ref("bob")];
    app.dependencies = vec![Reference::by_name(ObjectClass::Application, "HR")];
    app.account_selector_rules = vec![ApplicationAccountSelectorRule::new(
        Reference::by_name(ObjectClass::Application, "Active Directory"),
        Reference::by_name(ObjectClass::Rule, "Select Primary"),
    )];
    app.attributes.put("domain", "corp.example.com");

    round_trip(app.into());
}

#[test]
fn link_bundle_and_entitlement_round_trip() {
    let mut link = Link::new("CN=alice,OU=Users")
        .with_application(Reference::by_name(ObjectClass::Application, "Active Directory"))
        .with_identity(identity_ref("alice"));
    link.instance = Some("east".to_string());
    link.entitlements = true;
    link.last_refresh = Some(at(1_650_000_000_000));
    link.attributes.put("memberOf", vec!["Domain Users".to_string()]);
    round_trip(link.into());

    let mut bundle = Bundle::new("Auditor").with_type("business");
    bundle.display_name = Some("Auditor".to_string());
    bundle.inheritance = vec![role_ref("Employee")];
    bundle.permits = vec![role_ref("Report Viewer")];
    bundle.requirements = vec![role_ref("Finance Users")];
    bundle.activation_date = Some(at(1_700_000_000_000));
    bundle.risk_score_weight = 250;
    round_trip(bundle.into());

    let mut entitlement = ManagedAttribute::new(
        Reference::by_name(ObjectClass::Application, "Active Directory"),
        "memberOf",
        "CN=Admins",
    );
    entitlement.requestable = true;
    entitlement.display_name = Some("Admins".to_string());
    round_trip(entitlement.into());
}

#[test]
fn work_items_round_trip() {
    let mut item = WorkItem::new(WorkItemType::Approval, identity_ref("bob"));
    item.header_mut().name = Some("0000000042".to_string());
    item.state = Some(WorkItemState::Pending);
    item.level = WorkItemLevel::High;
    item.requester = Some(identity_ref("alice"));
    item.target_class = Some("Bundle".to_string());
    item.target_name = Some("Auditor".to_string());
    item.expiration = Some(at(1_800_000_000_000));
    item.escalation_count = 2;
    item.owner_history = vec![OwnerHistory {
        old_owner: Some("carol".to_string()),
        new_owner: Some("bob".to_string()),
        changed_by: Some("spadmin".to_string()),
        comment: None,
        start_date: at(1_700_000_000_000),
    }];
    item.comments = vec![Comment {
        author: "alice".to_string(),
        text: "Please approve <soon>".to_string(),
        date: at(1_700_000_100_000),
    }];
    item.owner_change_listener_ids = vec!["cert-1".to_string()];
    item.certification = Some("cert-1".to_string());
    round_trip(item.clone().into());

    let mut archive = WorkItemArchive::from_work_item(&item, Some("spadmin"));
    archive.archived = Some(at(1_700_000_200_000));
    round_trip(archive.into());
}

#[test]
fn certification_round_trip() {
    let mut cert = Certification::new("Manager Review: bob", CertificationType::Manager)
        .with_certifier("bob");
    cert.short_name = Some("MR-bob".to_string());
    cert.phase = Some(CertificationPhase::Active);
    cert.expiration = Some(at(1_800_000_000_000));
    cert.limit_reassignments = true;
    cert.reassignment_limit = 3;
    cert.reassignment_count = 1;
    cert.statistics.total_entities = 10;
    cert.statistics.completed_entities = 4;
    cert.statistics.decisions.insert(
        DecisionCategory::Roles,
        DecisionCounts {
            total: 5,
            approved: 3,
            ..DecisionCounts::default()
        },
    );
    cert.work_items = vec!["wi-1".to_string(), "wi-2".to_string()];

    round_trip(cert.into());
}

#[test]
fn policy_and_violation_round_trip() {
    let mut constraint = SodConstraint::new("AP vs AR");
    constraint.id = Some("c1".to_string());
    constraint.description = Some("Payables and receivables".to_string());
    constraint.left_bundles = vec![role_ref("Accounts Payable")];
    constraint.right_bundles = vec![role_ref("Accounts Receivable")];
    let mut policy = Policy::new("Finance SOD", "SOD").with_constraint(constraint.clone());
    policy.violation_owner = Some(identity_ref("bob"));
    policy.arguments.put("notify", true);
    round_trip(policy.clone().into());

    let violation = PolicyViolation::new(&policy, &constraint, identity_ref("alice"));
    round_trip(violation.into());
}

#[test]
fn infrastructure_objects_round_trip() {
    let mut scope = Scope::new("Finance");
    scope.parent = Some(Reference::by_name(ObjectClass::Scope, "Corp"));
    scope.path = Some("Corp:Finance".to_string());
    round_trip(scope.into());

    let mut server = Server::new("app01");
    server.heartbeat = Some(at(1_700_000_000_000));
    server.attributes.put("cpu", 0.75);
    round_trip(server.into());

    let stat = ServerStatistic::new(Reference::by_name(ObjectClass::Server, "app01"), "snap-1", "42");
    round_trip(stat.into());

    let mut rule = Rule::new("Select Primary", "AccountSelector");
    rule.language = Some("beanshell".to_string());
    rule.source = Some("if (a < b && c) { return \"x\"; }".to_string());
    rule.referenced_rules = vec![Reference::by_name(ObjectClass::Rule, "Common Library")];
    round_trip(rule.into());
}

#[test]
fn text_whitespace_survives_round_trip() {
    let mut rule = Rule::new("Padded", "Generic");
    rule.header.description = Some("  leading and trailing  ".to_string());
    rule.source = Some("\n    return x;\n".to_string());
    rule.attributes
        .put("names", vec![" padded ".to_string(), "  ".to_string()]);
    rule.attributes.put("inline", " kept ");
    round_trip(rule.into());
}

#[test]
fn task_objects_round_trip() {
    let definition = TaskDefinition::new("Prune Work Items", "prune-work-items")
        .with_argument("dryRun", true);
    round_trip(definition.clone().into());

    let mut result = TaskResult::for_definition(&definition, Some("spadmin"));
    result.launched = Some(at(1_700_000_000_000));
    result.add_info("pruned 3 expired work items");
    result.add_warning("1 item was locked");
    result.attributes.put("workItemsPruned", 3_i64);
    result.complete(at(1_700_000_001_500));
    assert_eq!(result.completion_status, Some(CompletionStatus::Warning));
    round_trip(result.into());
}

#[test]
fn parses_hand_written_document() {
    let xml = r#"<?xml version='1.0' encoding='UTF-8'?>
<!DOCTYPE sailpoint PUBLIC "sailpoint.dtd" "sailpoint.dtd">
<sailpoint>
  <Bundle name="Auditor" type="business" riskScoreWeight="100">
    <Description>Reviews the books</Description>
    <Owner>
      <Reference class="sailpoint.object.Identity" name="bob"/>
    </Owner>
    <Inheritance>
      <Reference class="sailpoint.object.Bundle" name="Employee"/>
    </Inheritance>
    <Attributes>
      <Map>
        <entry key="sensitive">
          <value><Boolean>true</Boolean></value>
        </entry>
      </Map>
    </Attributes>
  </Bundle>
  <Identity name="bob" email="bob@example.com"/>
</sailpoint>"#;

    let objects = parse_objects(xml).unwrap();
    assert_eq!(objects.len(), 2);

    let bundle: Bundle = objects[0].clone().downcast().unwrap();
    assert_eq!(bundle.role_type.as_deref(), Some("business"));
    assert_eq!(bundle.risk_score_weight, 100);
    assert_eq!(bundle.header.description.as_deref(), Some("Reviews the books"));
    assert_eq!(bundle.header.owner.as_ref().and_then(Reference::name), Some("bob"));
    assert_eq!(bundle.inheritance, vec![role_ref("Employee")]);
    assert!(bundle.attributes.get_boolean("sensitive"));

    let bob: Identity = objects[1].clone().downcast().unwrap();
    assert_eq!(bob.email.as_deref(), Some("bob@example.com"));
}

#[test]
fn bad_values_are_reported() {
    let codec = XmlCodec::new();
    assert!(codec.from_xml(r#"<Bundle name="x" riskScoreWeight="lots"/>"#).is_err());
    assert!(codec.from_xml(r#"<WorkItem type="Paperwork"/>"#).is_err());
    assert!(codec
        .from_xml(r#"<Identity name="x"><Manager><Reference class="Widget"/></Manager></Identity>"#)
        .is_err());
    assert!(Element::parse("<Identity name=\"x\">").is_err());
}
