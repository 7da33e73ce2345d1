#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::watch;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

use wright::action::Stage;
use wright::errors::ServiceError;
use wright::object::{DomainObject, Identifier};
use wright::patch::PropertyPatch;
use wright::services::*;

pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(false)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE),
        )
        .with(EnvFilter::from_default_env())
        .try_init()
        .unwrap_or(());
}

pub fn folder(key: &str, namespace: &str) -> DomainObject {
    DomainObject::new(Identifier::new(key, namespace), "folder", key)
}

/// Generates `key-1`, `key-2`, ...
#[derive(Default)]
pub struct SeqIds(AtomicUsize);

impl IdGenerator for SeqIds {
    fn next(&self) -> String {
        format!("key-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Answers the form with a fixed patch, or cancels it if there is none
#[derive(Default)]
pub struct Forms {
    pub patch: Mutex<Option<PropertyPatch>>,
    pub shown: Mutex<Vec<(FormStructure, DomainObject)>>,
    pub stage: Mutex<Option<watch::Receiver<Stage>>>,
    pub stage_while_shown: Mutex<Option<Stage>>,
}

impl Forms {
    pub fn answer(&self, patch: PropertyPatch) {
        *self.patch.lock().unwrap() = Some(patch);
    }

    pub fn follow(&self, stage: watch::Receiver<Stage>) {
        *self.stage.lock().unwrap() = Some(stage);
    }
}

#[async_trait]
impl FormRenderer for Forms {
    fn structure(&self, _object: &DomainObject, parent: &DomainObject) -> FormStructure {
        FormStructure {
            title: String::new(),
            sections: vec![json!({"name": "Properties", "parent": parent.identifier().key})],
        }
    }

    async fn show(&self, structure: FormStructure, object: &DomainObject) -> Option<PropertyPatch> {
        self.shown
            .lock()
            .unwrap()
            .push((structure, object.clone()));
        if let Some(stage) = self.stage.lock().unwrap().as_ref() {
            *self.stage_while_shown.lock().unwrap() = Some(*stage.borrow());
        }
        self.patch.lock().unwrap().take()
    }
}

/// Keeps saved objects in memory
///
/// The path of every saved object is the object itself followed by the
/// configured ancestors, unless the object is configured as unreadable.
#[derive(Default)]
pub struct Store {
    pub failure: Mutex<Option<String>>,
    pub path_failure: Mutex<Option<String>>,
    pub unreadable: Mutex<bool>,
    pub ancestors: Mutex<Vec<Option<DomainObject>>>,
    pub saved: Mutex<Vec<DomainObject>>,
    pub stage: Mutex<Option<watch::Receiver<Stage>>>,
    pub stage_while_saving: Mutex<Option<Stage>>,
}

impl Store {
    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn follow(&self, stage: watch::Receiver<Stage>) {
        *self.stage.lock().unwrap() = Some(stage);
    }
}

#[async_trait]
impl ObjectStore for Store {
    async fn save(&self, object: &DomainObject) -> Result<(), ServiceError> {
        if let Some(stage) = self.stage.lock().unwrap().as_ref() {
            *self.stage_while_saving.lock().unwrap() = Some(*stage.borrow());
        }
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(ServiceError::new(reason));
        }
        self.saved.lock().unwrap().push(object.clone());
        Ok(())
    }

    async fn original_path(
        &self,
        identifier: &Identifier,
    ) -> Result<Vec<Option<DomainObject>>, ServiceError> {
        if let Some(reason) = self.path_failure.lock().unwrap().clone() {
            return Err(ServiceError::new(reason));
        }

        if *self.unreadable.lock().unwrap() {
            return Ok(vec![None]);
        }

        let object = self
            .saved
            .lock()
            .unwrap()
            .iter()
            .find(|object| &object.identifier() == identifier)
            .cloned();
        let mut path = vec![object];
        path.extend(self.ancestors.lock().unwrap().iter().cloned());
        Ok(path)
    }
}

struct Collection(Arc<Mutex<Vec<DomainObject>>>);

impl wright::services::Composition for Collection {
    fn add(&mut self, child: &DomainObject) {
        self.0.lock().unwrap().push(child.clone());
    }
}

#[derive(Default)]
pub struct Compositions {
    pub failure: Mutex<Option<String>>,
    pub added: Arc<Mutex<Vec<DomainObject>>>,
    pub requested: Mutex<Vec<Identifier>>,
}

#[async_trait]
impl CompositionService for Compositions {
    async fn get(
        &self,
        parent: &DomainObject,
    ) -> Result<Box<dyn wright::services::Composition>, ServiceError> {
        self.requested.lock().unwrap().push(parent.identifier());
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(ServiceError::new(reason));
        }
        Ok(Box::new(Collection(self.added.clone())))
    }
}

#[derive(Default)]
pub struct Notices {
    pub info: Mutex<Vec<String>>,
    pub error: Mutex<Vec<String>>,
}

impl Notifications for Notices {
    fn info(&self, message: &str) {
        self.info.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.error.lock().unwrap().push(message.to_string());
    }
}

struct Dialog(Arc<AtomicUsize>);

impl ProgressDialog for Dialog {
    fn dismiss(self: Box<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct Overlays {
    pub shown: Mutex<Vec<ProgressOpts>>,
    pub dismissed: Arc<AtomicUsize>,
}

impl ProgressIndicator for Overlays {
    fn show(&self, opts: ProgressOpts) -> Box<dyn ProgressDialog> {
        self.shown.lock().unwrap().push(opts);
        Box::new(Dialog(self.dismissed.clone()))
    }
}

#[derive(Default)]
pub struct Browser {
    pub urls: Mutex<Vec<String>>,
}

impl Navigator for Browser {
    fn navigate(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_string());
    }
}

struct View(bool);

impl ObjectView for View {
    fn can_edit(&self, _object: &DomainObject, _path: &[Option<DomainObject>]) -> bool {
        self.0
    }
}

struct ReadOnlyView;

impl ObjectView for ReadOnlyView {}

/// Returns a single view for any object, editable or not
#[derive(Default)]
pub struct Views {
    pub editable: Mutex<Option<bool>>,
}

impl ViewRegistry for Views {
    fn get(&self, _object: &DomainObject, _path: &[Option<DomainObject>]) -> Vec<Arc<dyn ObjectView>> {
        match *self.editable.lock().unwrap() {
            Some(editable) => vec![Arc::new(View(editable)), Arc::new(View(!editable))],
            None => vec![Arc::new(ReadOnlyView)],
        }
    }
}

#[derive(Default)]
pub struct EditMode {
    pub edits: AtomicUsize,
}

impl Editor for EditMode {
    fn edit(&self) {
        self.edits.fetch_add(1, Ordering::SeqCst);
    }
}

/// All the collaborators needed for creating objects, with access to
/// what happened to each of them
pub struct Harness {
    pub types: Types,
    pub forms: Arc<Forms>,
    pub store: Arc<Store>,
    pub compositions: Arc<Compositions>,
    pub notices: Arc<Notices>,
    pub overlays: Arc<Overlays>,
    pub browser: Arc<Browser>,
    pub views: Arc<Views>,
    pub editor: Arc<EditMode>,
}

impl Default for Harness {
    fn default() -> Self {
        let types = Types::new()
            .with_type("folder", TypeDefinition::new("Folder"))
            .with_type(
                "plot",
                TypeDefinition::new("Plot").with_initializer(|object| {
                    object.properties_mut().insert(
                        "configuration".into(),
                        json!({"style": {"fillColor": "#000", "stroke": 1}, "series": null}),
                    );
                }),
            );

        Self {
            types,
            forms: Arc::default(),
            store: Arc::default(),
            compositions: Arc::default(),
            notices: Arc::default(),
            overlays: Arc::default(),
            browser: Arc::default(),
            views: Arc::default(),
            editor: Arc::default(),
        }
    }
}

impl Harness {
    pub fn services(&self) -> Services {
        Services {
            types: Arc::new(self.types.clone()),
            ids: Arc::new(SeqIds::default()),
            forms: self.forms.clone(),
            objects: self.store.clone(),
            composition: self.compositions.clone(),
            notifications: self.notices.clone(),
            overlays: self.overlays.clone(),
            navigator: self.browser.clone(),
            views: self.views.clone(),
            editor: self.editor.clone(),
        }
    }

    pub fn dismissed(&self) -> usize {
        self.overlays.dismissed.load(Ordering::SeqCst)
    }

    pub fn edits(&self) -> usize {
        self.editor.edits.load(Ordering::SeqCst)
    }
}
