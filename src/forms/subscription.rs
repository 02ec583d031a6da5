//! Subscription form session: owns one draft from open to close.

use tracing::{debug, info};

use crate::client::PluginApi;
use crate::engine::{self, Mode, SubscriptionSubmission, ValidationPolicy};
use crate::error::{AppError, AppResult};
use crate::models::{
    ChannelSubscription, ChannelSubscriptionDraft, EventCatalog, StatusResponse,
    SubscriptionType, ValidationResult,
};

/// Result of pressing "Save Subscription".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent; show these errors next to the inputs.
    Invalid(ValidationResult),
    /// The backend accepted the payload. The form is closed.
    Submitted {
        mode: Mode,
        payload: ChannelSubscription,
        status: StatusResponse,
    },
}

#[derive(Debug, Clone)]
pub struct SubscriptionForm {
    draft: ChannelSubscriptionDraft,
    prior: Option<ChannelSubscription>,
    catalog: EventCatalog,
    policy: ValidationPolicy,
    errors: ValidationResult,
    events_touched: bool,
    closed: bool,
}

impl SubscriptionForm {
    /// Blank form for a new subscription in `channel_id`.
    pub fn create(channel_id: impl Into<String>) -> Self {
        Self::open(ChannelSubscriptionDraft::new(channel_id), None)
    }

    /// Form pre-filled from `prior`; submitting renames/updates it.
    pub fn edit(prior: ChannelSubscription) -> Self {
        let draft = ChannelSubscriptionDraft::from_subscription(&prior);
        Self::open(draft, Some(prior))
    }

    fn open(draft: ChannelSubscriptionDraft, prior: Option<ChannelSubscription>) -> Self {
        Self {
            draft,
            prior,
            catalog: EventCatalog::default(),
            policy: ValidationPolicy::default(),
            errors: ValidationResult::default(),
            events_touched: false,
            closed: false,
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn draft(&self) -> &ChannelSubscriptionDraft {
        &self.draft
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.draft.alias = alias.into();
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.draft.base_url = base_url.into();
    }

    pub fn set_space_key(&mut self, space_key: impl Into<String>) {
        self.draft.space_key = space_key.into();
    }

    pub fn set_page_id(&mut self, page_id: impl Into<String>) {
        self.draft.page_id = page_id.into();
    }

    pub fn set_subscription_type(&mut self, subscription_type: SubscriptionType) {
        self.draft.subscription_type = subscription_type;
    }

    /// Replace the selected events.
    pub fn set_events<I, S>(&mut self, events: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.events = events.into_iter().map(Into::into).collect();
        self.events_touched = true;
    }

    /// Flip one event on or off.
    pub fn toggle_event(&mut self, event: &str) {
        if !self.draft.events.remove(event) {
            self.draft.events.insert(event.to_string());
        }
        self.events_touched = true;
    }

    /// Deliver a (possibly late) catalog.
    ///
    /// Only the selectable list changes. A create form whose events were never touched
    /// starts with every catalog entry selected. Returns `false` once the form is closed.
    pub fn apply_catalog(&mut self, catalog: EventCatalog) -> bool {
        if self.closed {
            debug!(channel_id = %self.draft.channel_id, "catalog arrived after form closed, ignored");
            return false;
        }
        if self.prior.is_none() && !self.events_touched {
            self.draft.events = catalog.values().map(String::from).collect();
        }
        self.catalog = catalog;
        true
    }

    /// Run the engine against the current draft and remember the resulting errors.
    pub fn prepare(&mut self) -> Result<SubscriptionSubmission, ValidationResult> {
        let prepared = engine::prepare_subscription(
            &self.draft,
            self.prior.as_ref(),
            &self.catalog,
            self.policy,
        );
        self.errors = match &prepared {
            Ok(_) => ValidationResult::default(),
            Err(errors) => errors.clone(),
        };
        prepared
    }

    /// Validate, then POST (create) or PUT (update). Transport failures propagate unchanged
    /// and leave the form open so the user can retry.
    pub async fn submit(&mut self, api: &dyn PluginApi) -> AppResult<SubmitOutcome> {
        if self.closed {
            return Err(AppError::Validation("subscription form is closed".to_string()));
        }
        let submission = match self.prepare() {
            Ok(submission) => submission,
            Err(errors) => {
                debug!(channel_id = %self.draft.channel_id, errors = %errors, "subscription draft rejected");
                return Ok(SubmitOutcome::Invalid(errors));
            }
        };

        let SubscriptionSubmission { mode, payload } = submission;
        let status = match mode {
            Mode::Create => api.save_subscription(&payload).await?,
            Mode::Update => api.edit_subscription(&payload).await?,
        };
        info!(channel_id = %payload.channel_id, alias = %payload.alias, ?mode, "subscription submitted");
        self.close();
        Ok(SubmitOutcome::Submitted {
            mode,
            payload,
            status,
        })
    }

    /// Discard the draft. Late catalog deliveries are ignored from here on.
    pub fn close(&mut self) {
        self.closed = true;
        self.errors = ValidationResult::default();
    }
}

/// Fetch the event catalog for a subscription form.
pub async fn load_catalog(api: &dyn PluginApi) -> AppResult<EventCatalog> {
    Ok(api.fetch_config().await?.supported_events)
}
