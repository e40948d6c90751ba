//! Commands run against a file-backed session.

use std::path::{Path, PathBuf};

use ig_cli::commands::delete::delete_object;
use ig_cli::commands::export::export_xml;
use ig_cli::commands::import::{import_file, ImportStats};
use ig_cli::commands::query::{certification_rows, count_rows, list_rows};
use ig_cli::commands::task::{parse_overrides, run_definition};
use ig_cli::{CliConfig, CliError, Session};
use ig_model::{
    AnyObject, Certification, CompletionStatus, Identity, Link, ObjectClass, PersistentObject, Reference,
    WorkItemArchive,
};
use ig_spi::ExecutorRegistry;
use ig_storage::store::{get_by_name, list_of};
use ig_storage::ObjectStore;
use tempfile::TempDir;

const FIXTURE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<!DOCTYPE sailpoint PUBLIC "sailpoint.dtd" "sailpoint.dtd">
<sailpoint>
  <Identity name="bob" email="bob@example.com"/>
  <Identity name="alice" firstname="Alice" lastname="Smith">
    <Manager>
      <Reference class="sailpoint.object.Identity" name="bob"/>
    </Manager>
  </Identity>
  <Application name="Active Directory" type="Active Directory - Direct" featuresString="PROVISIONING"/>
  <Link nativeIdentity="CN=alice,OU=Users">
    <IdentityRef>
      <Reference class="sailpoint.object.Identity" name="alice"/>
    </IdentityRef>
    <ApplicationRef>
      <Reference class="sailpoint.object.Application" name="Active Directory"/>
    </ApplicationRef>
  </Link>
  <Bundle name="Auditor" type="business"/>
  <Certification name="Manager Review: bob" type="Manager" phase="Active">
    <CertificationStatistics totalEntities="4" completedEntities="1" delegatedEntities="1" totalItems="10" completedItems="5" percentComplete="25">
      <DecisionCounts category="roles" total="3" approved="2" remediated="1"/>
    </CertificationStatistics>
  </Certification>
  <TaskDefinition name="Prune Work Items" executor="prune-work-items">
    <Attributes>
      <Map>
        <entry key="archive">
          <value><Boolean>true</Boolean></value>
        </entry>
      </Map>
    </Attributes>
  </TaskDefinition>
  <WorkItem name="0000000001" type="Approval" expiration="1000">
    <Owner>
      <Reference class="sailpoint.object.Identity" name="bob"/>
    </Owner>
  </WorkItem>
</sailpoint>
"#;

struct Fixture {
    dir: TempDir,
    config: CliConfig,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fixture.xml"), FIXTURE).unwrap();
        let mut config = CliConfig::default();
        config.user = "admin".to_string();
        Self { dir, config }
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    fn xml_path(&self) -> PathBuf {
        self.dir.path().join("fixture.xml")
    }

    fn open(&self) -> Session {
        Session::open(&self.config, Some(&self.store_path())).unwrap()
    }

    async fn imported(&self) -> Session {
        let session = self.open();
        import_file(&session, &self.xml_path(), false).await.unwrap();
        session.commit().unwrap();
        session
    }
}

fn assert_exists(path: &Path) {
    assert!(path.exists(), "{} should exist", path.display());
}

#[tokio::test]
async fn import_persists_and_reimport_updates() {
    let fixture = Fixture::new();
    let session = fixture.open();

    let stats = import_file(&session, &fixture.xml_path(), false).await.unwrap();
    assert_eq!(
        stats,
        ImportStats {
            created: 8,
            updated: 0,
            skipped: 0
        }
    );
    session.commit().unwrap();
    assert_exists(&fixture.store_path());

    let reopened = fixture.open();
    let alice: Identity = get_by_name(reopened.store().as_ref(), "alice").await.unwrap().unwrap();
    assert_eq!(alice.manager.as_ref().and_then(Reference::name), Some("bob"));
    let alice_id = alice.header.id.clone();

    // Objects are matched by unique name or unique key; the work item has
    // neither and is created again.
    let stats = import_file(&reopened, &fixture.xml_path(), false).await.unwrap();
    assert_eq!(stats.updated, 7);
    assert_eq!(stats.created, 1);

    let alice: Identity = get_by_name(reopened.store().as_ref(), "alice").await.unwrap().unwrap();
    assert_eq!(alice.header.id, alice_id);

    let stats = import_file(&reopened, &fixture.xml_path(), true).await.unwrap();
    assert_eq!(stats.skipped, 7);
}

#[tokio::test]
async fn foreign_ids_match_by_name() {
    let fixture = Fixture::new();
    let session = fixture.imported().await;
    let auditor = session.require(ObjectClass::Bundle, "Auditor").await.unwrap();

    let path = fixture.dir.path().join("other-system.xml");
    std::fs::write(
        &path,
        r#"<Bundle id="from-other-system" name="Auditor" type="business">
  <Description>Imported elsewhere</Description>
</Bundle>"#,
    )
    .unwrap();

    let stats = import_file(&session, &path, false).await.unwrap();
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.created, 0);

    let reimported = session.require(ObjectClass::Bundle, "Auditor").await.unwrap();
    assert_eq!(reimported.id(), auditor.id());
    assert_eq!(reimported.as_persistent().header().description.as_deref(), Some("Imported elsewhere"));
    assert!(session.find(ObjectClass::Bundle, "from-other-system").await.unwrap().is_none());
    assert_eq!(session.store().count(ObjectClass::Bundle).await.unwrap(), 1);
}

#[tokio::test]
async fn autosave_off_leaves_file_alone() {
    let mut fixture = Fixture::new();
    fixture.config.storage.autosave = false;

    let session = fixture.open();
    import_file(&session, &fixture.xml_path(), false).await.unwrap();
    session.commit().unwrap();
    assert!(!fixture.store_path().exists());
}

#[tokio::test]
async fn export_single_and_whole_class() {
    let fixture = Fixture::new();
    let session = fixture.imported().await;

    let (xml, count) = export_xml(&session, ObjectClass::Identity, &["alice".to_string()])
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert!(!xml.contains("<sailpoint>"));
    let alice = session.codec().from_xml(&xml).unwrap();
    assert_eq!(alice.name(), Some("alice"));

    let (xml, count) = export_xml(&session, ObjectClass::Identity, &[]).await.unwrap();
    assert_eq!(count, 2);
    let objects = session.codec().parse_objects(&xml).unwrap();
    let names: Vec<_> = objects.iter().filter_map(AnyObject::name).collect();
    assert_eq!(names, vec!["alice", "bob"]);

    let missing = export_xml(&session, ObjectClass::Bundle, &["Nobody".to_string()]).await;
    assert!(matches!(missing, Err(CliError::NotFound { .. })));
}

#[tokio::test]
async fn listing_and_counts() {
    let fixture = Fixture::new();
    let session = fixture.imported().await;

    let rows = list_rows(&session, ObjectClass::Identity, Some("ALI")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "alice");
    assert!(!rows[0].id.is_empty());

    let counts = count_rows(&session).await.unwrap();
    let identities = counts.iter().find(|r| r.class == "Identity").unwrap();
    assert_eq!(identities.count, 2);
    assert!(counts.iter().all(|r| r.count > 0));
}

#[tokio::test]
async fn delete_cascades_and_persists() {
    let fixture = Fixture::new();
    let session = fixture.imported().await;

    let alice = session.require(ObjectClass::Identity, "alice").await.unwrap();
    let deleted = delete_object(&session, &alice).await.unwrap();
    session.commit().unwrap();

    assert_eq!(deleted.len(), 2);
    assert_eq!(deleted[0].class, ObjectClass::Link);
    assert_eq!(deleted.last().and_then(Reference::name), Some("alice"));

    let reopened = fixture.open();
    assert!(reopened.find(ObjectClass::Identity, "alice").await.unwrap().is_none());
    let links: Vec<Link> = list_of(reopened.store().as_ref()).await.unwrap();
    assert!(links.is_empty());
}

#[tokio::test]
async fn certification_statistics_rows() {
    let fixture = Fixture::new();
    let session = fixture.imported().await;

    let cert: Certification = session
        .require(ObjectClass::Certification, "Manager Review: bob")
        .await
        .unwrap()
        .downcast()
        .unwrap();
    let (stats, decisions) = certification_rows(&cert);

    let value = |metric: &str| {
        stats
            .iter()
            .find(|r| r.metric == metric)
            .map(|r| r.value.clone())
            .unwrap()
    };
    assert_eq!(value("entities"), "4");
    assert_eq!(value("entities open"), "2");
    assert_eq!(value("items open"), "5");
    assert_eq!(value("percent complete"), "25%");

    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].category, "roles");
    assert_eq!(decisions[0].approved, 2);
}

#[tokio::test]
async fn prune_task_runs_from_stored_definition() {
    let fixture = Fixture::new();
    let session = fixture.imported().await;
    let registry = ExecutorRegistry::with_builtins();

    let dry_run = parse_overrides(&["dryRun=true".to_string()]).unwrap();
    let result = run_definition(&session, &registry, "Prune Work Items", &dry_run)
        .await
        .unwrap();
    assert_eq!(result.completion_status, Some(CompletionStatus::Success));
    assert_eq!(session.store().count(ObjectClass::WorkItem).await.unwrap(), 1);

    let result = run_definition(&session, &registry, "Prune Work Items", &parse_overrides(&[]).unwrap())
        .await
        .unwrap();
    assert_eq!(result.attributes.get_long("workItemsPruned"), Some(1));
    assert_eq!(result.launcher.as_deref(), Some("admin"));
    assert_eq!(session.store().count(ObjectClass::WorkItem).await.unwrap(), 0);

    let archives: Vec<WorkItemArchive> = list_of(session.store().as_ref()).await.unwrap();
    assert_eq!(archives.len(), 1);
    assert_eq!(archives[0].owner_name.as_deref(), Some("bob"));
    assert_eq!(session.store().count(ObjectClass::TaskResult).await.unwrap(), 1);

    let missing = run_definition(&session, &registry, "Nope", &parse_overrides(&[]).unwrap()).await;
    assert!(matches!(missing, Err(CliError::NotFound { .. })));
}
