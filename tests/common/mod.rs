#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use crmbot::auth::AllowList;
use crmbot::backup::SqlScriptBackup;
use crmbot::db::{schema, CrmStore, Database};
use crmbot::dispatch::Dispatcher;
use crmbot::pipeline::{PipelineSettings, ReportPipeline};

pub const AUTHORIZED: i64 = 123456789;
pub const STRANGER: i64 = 555;

pub fn seeded_database() -> Database {
    let db = Database::in_memory().unwrap();
    db.initialize_schema().unwrap();
    db.execute_script(schema::SAMPLE_DATA).unwrap();
    db
}

pub fn pipeline_for(db: Database, settings: PipelineSettings) -> ReportPipeline {
    let store: Arc<dyn CrmStore> = Arc::new(db);
    let backup = Arc::new(SqlScriptBackup::new(Arc::clone(&store), "perfex", Duration::from_secs(10)));
    ReportPipeline::new(store, backup, settings)
}

pub fn dispatcher() -> Dispatcher {
    let pipeline = pipeline_for(seeded_database(), PipelineSettings::default());
    Dispatcher::new(Arc::new(pipeline), AllowList::new([AUTHORIZED]))
}
