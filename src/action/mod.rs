//! Object creation workflow
//!
//! A [`CreateAction`] creates a new domain object of a given type inside a
//! parent object. The workflow goes through the following stages
//!
//! ```text
//! Idle -> FormShown -> Saving -> Succeeded | Failed -> Idle
//! ```
//!
//! - the object is built in memory with a fresh key, a default name and
//!   whatever defaults its type initializer sets.
//! - a form is shown to the user. Cancelling the form ends the workflow.
//! - the form edits are applied to the object, which gets linked to the
//!   parent namespace and location and saved to the store. A progress
//!   dialog is shown while the save is pending.
//! - on success the object is added to the parent composition, the user is
//!   navigated to the new object and edit mode is entered if the object view
//!   supports it.
//! - on failure the user is notified and the workflow stops. The object and
//!   the store error are returned to the caller.
use anyhow::Context;
use json_patch::diff;
use tokio::sync::watch;
use tracing::{debug, field, info, span, warn, Instrument, Level, Span};

use crate::errors::{Error, PersistenceFailure, PostSaveError, UnknownType};
use crate::object::{now, DomainObject, Identifier};
use crate::patch::PropertyPatch;
use crate::services::{FormStructure, ProgressOpts, Services};

mod navigation;
mod progress;

use progress::Progress;

#[derive(Clone, Debug)]
pub struct Opts {
    /// Title of the progress dialog shown while saving
    progress_title: String,
    /// Message of the progress dialog shown while saving
    progress_message: String,
    /// Icon of the progress dialog
    progress_icon: String,
    /// Notification sent after a successful save
    success_message: String,
    /// Notification sent if the save fails
    failure_message: String,
    /// Prefix of the URL used for navigating to the new object
    browse_prefix: String,
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            progress_title: "Saving".into(),
            progress_message: "Do not navigate away from this page or close this browser tab while this message is displayed.".into(),
            progress_icon: "info".into(),
            success_message: "Save successful".into(),
            failure_message: "Error saving objects".into(),
            browse_prefix: "#/browse/".into(),
        }
    }
}

impl Opts {
    pub fn progress_title(self, title: impl Into<String>) -> Self {
        let mut opts = self;
        opts.progress_title = title.into();
        opts
    }

    pub fn progress_message(self, message: impl Into<String>) -> Self {
        let mut opts = self;
        opts.progress_message = message.into();
        opts
    }

    pub fn progress_icon(self, icon_class: impl Into<String>) -> Self {
        let mut opts = self;
        opts.progress_icon = icon_class.into();
        opts
    }

    pub fn success_message(self, message: impl Into<String>) -> Self {
        let mut opts = self;
        opts.success_message = message.into();
        opts
    }

    pub fn failure_message(self, message: impl Into<String>) -> Self {
        let mut opts = self;
        opts.failure_message = message.into();
        opts
    }

    pub fn browse_prefix(self, prefix: impl Into<String>) -> Self {
        let mut opts = self;
        opts.browse_prefix = prefix.into();
        opts
    }

    fn progress(&self) -> ProgressOpts {
        ProgressOpts {
            title: self.progress_title.clone(),
            message: self.progress_message.clone(),
            icon_class: self.progress_icon.clone(),
            progress: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// No creation in progress
    Idle,
    /// Waiting for the user to fill the form
    FormShown,
    /// The object is being saved
    Saving,
    /// The object was saved
    Succeeded,
    /// The store failed to save the object
    Failed,
}

/// A new object, ready to be edited by the user
#[derive(Clone, Debug)]
pub struct Draft {
    pub object: DomainObject,
    pub form: FormStructure,
}

/// A successfully created object
#[derive(Clone, Debug)]
pub struct Created {
    pub object: DomainObject,
    /// Location the application was navigated to
    pub url: String,
    /// True if edit mode was requested for the new object
    pub editing: bool,
}

#[derive(Clone, Debug)]
pub enum Outcome {
    /// The object was created
    Created(Created),
    /// The user cancelled the form
    Cancelled,
}

/// Creates a new object of a given type inside a parent object
pub struct CreateAction {
    type_key: String,
    parent: DomainObject,
    services: Services,
    opts: Opts,
    stage: watch::Sender<Stage>,
}

// Returns the workflow to idle when going out of scope
struct ResetStage<'a>(&'a watch::Sender<Stage>);

impl Drop for ResetStage<'_> {
    fn drop(&mut self) {
        self.0.send_replace(Stage::Idle);
    }
}

impl CreateAction {
    pub fn new(services: Services, type_key: impl Into<String>, parent: DomainObject) -> Self {
        let (stage, _) = watch::channel(Stage::Idle);
        Self {
            type_key: type_key.into(),
            parent,
            services,
            opts: Opts::default(),
            stage,
        }
    }

    pub fn with_opts(self, opts: Opts) -> Self {
        let mut action = self;
        action.opts = opts;
        action
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn parent(&self) -> &DomainObject {
        &self.parent
    }

    /// Follow the workflow stage
    pub fn stage(&self) -> watch::Receiver<Stage> {
        self.stage.subscribe()
    }

    fn set_stage(&self, stage: Stage) {
        debug!(?stage, "stage changed");
        self.stage.send_replace(stage);
    }

    /// Run the full creation workflow
    ///
    /// Shows the creation form and, if the user confirms, saves the object
    /// and navigates to it.
    pub async fn invoke(&self) -> Result<Outcome, Error> {
        let span = span!(
            Level::INFO,
            "create_object",
            type_key = %self.type_key,
            key = field::Empty
        );

        async {
            let Draft { object, form } = self.draft()?;
            Span::current().record("key", object.identifier().key.as_str());

            let _reset = ResetStage(&self.stage);
            self.set_stage(Stage::FormShown);
            let Some(patch) = self.services.forms.show(form, &object).await else {
                info!("object creation cancelled");
                return Ok(Outcome::Cancelled);
            };

            self.save(object, patch).await.map(Outcome::Created)
        }
        .instrument(span)
        .await
    }

    /// Build a new object of the action type along with its creation form
    pub fn draft(&self) -> Result<Draft, UnknownType> {
        let definition = self
            .services
            .types
            .get(&self.type_key)
            .ok_or_else(|| UnknownType(self.type_key.clone()))?;

        let identifier = Identifier::new(
            self.services.ids.next(),
            self.parent.identifier().namespace,
        );
        let mut object = DomainObject::new(
            identifier,
            self.type_key.as_str(),
            format!("Unnamed {}", definition.name),
        );
        definition.initialize(&mut object);

        let mut form = self.services.forms.structure(&object, &self.parent);
        form.title = format!("Create a New {}", definition.name);

        Ok(Draft { object, form })
    }

    /// Apply the user edits to the object and save it
    ///
    /// This is what happens when the user confirms the creation form.
    pub async fn on_save(
        &self,
        object: DomainObject,
        patch: PropertyPatch,
    ) -> Result<Created, Error> {
        let span = span!(
            Level::INFO,
            "create_object",
            type_key = %self.type_key,
            key = %object.identifier().key
        );
        let _reset = ResetStage(&self.stage);
        self.save(object, patch).instrument(span).await
    }

    async fn save(&self, object: DomainObject, patch: PropertyPatch) -> Result<Created, Error> {
        self.set_stage(Stage::Saving);

        let mut object = object;
        let before = object.to_value();
        let Identifier { key, .. } = object.identifier();
        object.patch(&patch)?;

        // the key is set once on creation and the parent namespace
        // always wins
        let parent = self.parent.identifier();
        if object.identifier().key != key {
            warn!("form changes cannot modify the object key, ignoring");
        }
        object.set_identifier(&Identifier::new(key, parent.namespace.as_str()));
        object.set_modified(now());
        object.set_location(parent.key_string());
        debug!(changes = ?diff(&before, &object.to_value()), "form changes applied");

        let progress = Progress::show(self.services.overlays.as_ref(), self.opts.progress());
        let saved = self.services.objects.save(&object).await;
        progress.dismiss();

        if let Err(source) = saved {
            warn!(reason = %source, "failed to save object");
            self.set_stage(Stage::Failed);
            self.services.notifications.error(&self.opts.failure_message);
            return Err(PersistenceFailure {
                object: Box::new(object),
                source,
            }
            .into());
        }
        self.set_stage(Stage::Succeeded);

        let (url, editing) = self
            .link_and_navigate(&object)
            .await
            .map_err(PostSaveError::from)?;

        self.services.notifications.info(&self.opts.success_message);
        info!(%url, editing, "object created");

        Ok(Created {
            object,
            url,
            editing,
        })
    }

    async fn link_and_navigate(&self, object: &DomainObject) -> anyhow::Result<(String, bool)> {
        let mut composition = self
            .services
            .composition
            .get(&self.parent)
            .await
            .context("failed to read the parent composition")?;
        composition.add(object);

        let path = self
            .services
            .objects
            .original_path(&object.identifier())
            .await
            .context("failed to resolve the object path")?;

        let url = navigation::browse_url(&self.opts.browse_prefix, object, &path)?;
        self.services.navigator.navigate(&url);

        let editing = self
            .services
            .views
            .get(object, &path)
            .first()
            .is_some_and(|view| view.can_edit(object, &path));
        if editing {
            self.services.editor.edit();
        }

        Ok((url, editing))
    }
}
