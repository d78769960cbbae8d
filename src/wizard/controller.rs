// Wizard state controller
// Drives the six-step listing flow: per-step validation gating, navigation,
// and submit/edit orchestration. Framework-independent: the host UI calls
// plain command methods and renders whatever state it reads back.

use log::{info, warn};

use super::step::Step;
use crate::api::ListingApi;
use crate::error::WizardError;
use crate::models::category::CategoryOption;
use crate::models::fields::{Field, FieldValue, ListingDraft};
use crate::models::record::ListingRecord;
use crate::normalize::{from_persistence, to_persistence};
use crate::utils::validation::is_blank;

/// How the wizard was entered. Edit mode carries the id of the listing
/// being revised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit(String),
}

/// What a completed submission did. Either way the host navigates back to
/// the collection view.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(ListingRecord),
    Updated(ListingRecord),
    /// A prior submit is still unresolved; nothing was sent.
    AlreadyInFlight,
}

pub struct ListingWizard<A: ListingApi> {
    api: A,
    mode: WizardMode,
    draft: ListingDraft,
    step: Step,
    categories: Vec<CategoryOption>,
    // Session epoch, bumped on every (re)initialize. Category snapshots that
    // finish loading after the wizard moved on carry a stale epoch and are
    // dropped instead of overwriting the new session's state.
    epoch: u64,
    // In-flight guard: submit() is a no-op while a prior call is unresolved.
    submitting: bool,
}

impl<A: ListingApi> ListingWizard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            mode: WizardMode::Create,
            draft: ListingDraft::default(),
            step: Step::BasicInfo,
            categories: Vec::new(),
            epoch: 0,
            submitting: false,
        }
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn current_step(&self) -> Step {
        self.step
    }

    pub fn categories(&self) -> &[CategoryOption] {
        &self.categories
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Start (or restart) a compose session.
    ///
    /// Create mode resets to defaults at step 0. Edit mode additionally
    /// fetches the existing record and reverse-transforms it into the draft;
    /// a fetch failure is returned so the host aborts to the collection view
    /// rather than showing a partial wizard.
    pub async fn initialize(&mut self, mode: WizardMode) -> Result<(), WizardError> {
        self.epoch += 1;
        self.draft = ListingDraft::default();
        self.step = Step::BasicInfo;
        self.categories.clear();
        self.submitting = false;

        match &mode {
            WizardMode::Create => {
                info!(
                    "[PHASE: initialization] Wizard session {} started in create mode",
                    self.epoch
                );
            }
            WizardMode::Edit(id) => {
                info!(
                    "[PHASE: initialization] Wizard session {} started in edit mode for {}",
                    self.epoch, id
                );
                let record = self.api.fetch(id).await?;
                self.draft = from_persistence(&record);
            }
        }

        self.mode = mode;
        Ok(())
    }

    /// Apply a category snapshot fetched for the given session. Returns
    /// false when the snapshot is stale (the wizard re-initialized while the
    /// fetch was in flight) and was dropped.
    pub fn apply_categories(&mut self, epoch: u64, options: Vec<CategoryOption>) -> bool {
        if epoch != self.epoch {
            warn!(
                "[PHASE: category_load] Dropping stale category snapshot (epoch {} != {})",
                epoch, self.epoch
            );
            return false;
        }
        self.categories = options;
        true
    }

    /// Merge one field into the draft. Always succeeds; validation is
    /// deferred to step transitions. A payload of the wrong shape for the
    /// field is logged and ignored.
    pub fn set_field(&mut self, field: Field, value: FieldValue) {
        match (field, value) {
            (Field::Title, FieldValue::Text(v)) => self.draft.title = v,
            (Field::Category, FieldValue::Text(v)) => {
                // A different category invalidates any previously chosen
                // subcategory.
                if v != self.draft.category {
                    self.draft.subcategory.clear();
                }
                self.draft.category = v;
            }
            (Field::Subcategory, FieldValue::Text(v)) => self.draft.subcategory = v,
            (Field::Brand, FieldValue::Text(v)) => self.draft.brand = v,
            (Field::Condition, FieldValue::Text(v)) => self.draft.condition = v,
            (Field::Description, FieldValue::Text(v)) => self.draft.description = v,
            (Field::Specifications, FieldValue::Specs(v)) => self.draft.specifications = v,
            (Field::Price, FieldValue::Text(v)) => self.draft.price = v,
            (Field::PricePeriod, FieldValue::Period(v)) => self.draft.price_period = v,
            (Field::Deposit, FieldValue::Text(v)) => self.draft.deposit = v,
            (Field::MinDuration, FieldValue::Text(v)) => self.draft.min_duration = v,
            (Field::AvailableFrom, FieldValue::Text(v)) => self.draft.available_from = v,
            (Field::AvailableTo, FieldValue::Text(v)) => self.draft.available_to = v,
            (Field::Location, FieldValue::Text(v)) => self.draft.location = v,
            (Field::Delivery, FieldValue::Flag(v)) => self.draft.delivery = v,
            (Field::Shipping, FieldValue::Text(v)) => self.draft.shipping = v,
            (Field::Images, FieldValue::Images(v)) => self.draft.images = v,
            (Field::Video, FieldValue::Text(v)) => self.draft.video = v,
            (Field::RentalTerms, FieldValue::Text(v)) => self.draft.rental_terms = v,
            (Field::AcceptDeposit, FieldValue::Flag(v)) => self.draft.accept_deposit = v,
            (Field::Cancellation, FieldValue::Policy(v)) => self.draft.cancellation = v,
            (Field::Notes, FieldValue::Text(v)) => self.draft.notes = v,
            (Field::IsFeatured, FieldValue::Flag(v)) => self.draft.is_featured = v,
            (Field::Status, FieldValue::State(v)) => self.draft.status = v,
            (field, value) => {
                warn!(
                    "[PHASE: validation] Ignoring {:?} payload of wrong shape: {:?}",
                    field, value
                );
            }
        }
    }

    /// Labels of the fields still blocking the given step, empty when the
    /// step may advance.
    pub fn missing_for_step(&self, step: Step) -> Vec<&'static str> {
        let d = &self.draft;
        let mut missing = Vec::new();
        match step {
            Step::BasicInfo => {
                if is_blank(&d.title) {
                    missing.push("title");
                }
                if is_blank(&d.category) {
                    missing.push("category");
                }
                if is_blank(&d.condition) {
                    missing.push("condition");
                }
            }
            Step::Details => {
                if is_blank(&d.description) {
                    missing.push("description");
                }
                if is_blank(&d.price) {
                    missing.push("price");
                }
                // Fully-empty rows are fine (and stripped at submit); a row
                // with only one side filled blocks the step.
                if d.specifications.iter().any(|pair| pair.is_partial()) {
                    missing.push("specifications (both name and value)");
                }
            }
            Step::Availability => {
                if is_blank(&d.location) {
                    missing.push("location");
                }
            }
            Step::Media => {
                if d.images.is_empty() {
                    missing.push("at least one photo");
                }
            }
            Step::Terms => {
                if is_blank(&d.rental_terms) {
                    missing.push("rental terms");
                }
            }
            Step::Review => {}
        }
        missing
    }

    pub fn validate_step(&self, step: Step) -> Result<(), WizardError> {
        let missing = self.missing_for_step(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Validation(format!(
                "Please fill the required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Advance one step if the current step validates; clamped at Review.
    pub fn go_next(&mut self) -> Result<Step, WizardError> {
        match self.validate_step(self.step) {
            Ok(()) => {
                self.step = self.step.next();
                info!(
                    "[PHASE: navigation] [STEP: go_next] Advanced to step {} ({})",
                    self.step.index(),
                    self.step.title()
                );
                Ok(self.step)
            }
            Err(e) => {
                info!(
                    "[PHASE: validation] Step {} blocked: {}",
                    self.step.index(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Step back without validation; clamped at the first step.
    pub fn go_prev(&mut self) -> Step {
        self.step = self.step.prev();
        self.step
    }

    /// Jump directly to an already-reached step (review links, step
    /// indicator clicks). Forward jumps past the frontier are a no-op;
    /// returns whether the jump happened.
    pub fn go_to_step(&mut self, step: Step) -> bool {
        if step > self.step {
            info!(
                "[PHASE: navigation] [STEP: go_to_step] Rejected forward jump to step {}",
                step.index()
            );
            return false;
        }
        self.step = step;
        true
    }

    /// Validate the whole draft, build the persistence payload, and create
    /// or update the listing. On create success the wizard resets to
    /// defaults; on update success the state is left intact. Either outcome
    /// signals the host to navigate back to the collection view.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, WizardError> {
        if self.submitting {
            info!("[PHASE: submission] Ignoring submit while one is in flight");
            return Ok(SubmitOutcome::AlreadyInFlight);
        }

        self.submitting = true;
        let result = self.submit_inner().await;
        self.submitting = false;

        if let Err(e) = &result {
            warn!("[PHASE: submission] Submit failed: {}", e);
        }
        result
    }

    async fn submit_inner(&mut self) -> Result<SubmitOutcome, WizardError> {
        // Required regardless of which step they were entered on.
        let d = &self.draft;
        let mut missing = Vec::new();
        for (label, value) in [
            ("title", &d.title),
            ("description", &d.description),
            ("price", &d.price),
            ("category", &d.category),
            ("location", &d.location),
        ] {
            if is_blank(value) {
                missing.push(label);
            }
        }
        if !missing.is_empty() {
            return Err(WizardError::Validation(format!(
                "Please fill the required fields: {}",
                missing.join(", ")
            )));
        }

        let payload = to_persistence(&self.draft)?;

        match self.mode.clone() {
            WizardMode::Create => {
                let created = self.api.create(&payload).await?;
                self.draft = ListingDraft::default();
                self.step = Step::BasicInfo;
                Ok(SubmitOutcome::Created(created))
            }
            WizardMode::Edit(id) => {
                let updated = self.api.update(&id, &payload).await?;
                Ok(SubmitOutcome::Updated(updated))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::SpecPair;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Recording fake for the listing collaborator. Counts calls and keeps
    /// the last payload it was handed; optionally fails everything.
    struct RecordingListingApi {
        fetch_result: Option<ListingRecord>,
        fail_submission: bool,
        fetch_calls: AtomicU32,
        create_calls: AtomicU32,
        update_calls: AtomicU32,
        last_payload: Mutex<Option<ListingRecord>>,
        last_update_id: Mutex<Option<String>>,
    }

    impl RecordingListingApi {
        fn new() -> Self {
            Self {
                fetch_result: None,
                fail_submission: false,
                fetch_calls: AtomicU32::new(0),
                create_calls: AtomicU32::new(0),
                update_calls: AtomicU32::new(0),
                last_payload: Mutex::new(None),
                last_update_id: Mutex::new(None),
            }
        }

        fn serving(record: ListingRecord) -> Self {
            let mut api = Self::new();
            api.fetch_result = Some(record);
            api
        }

        fn failing_submission() -> Self {
            let mut api = Self::new();
            api.fail_submission = true;
            api
        }
    }

    #[async_trait]
    impl ListingApi for RecordingListingApi {
        async fn fetch(&self, _id: &str) -> Result<ListingRecord, WizardError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.fetch_result.clone().ok_or_else(|| {
                WizardError::Fetch("Failed to load the listing. Please try again.".to_string())
            })
        }

        async fn create(&self, record: &ListingRecord) -> Result<ListingRecord, WizardError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_submission {
                return Err(WizardError::Submission("backend rejected create".to_string()));
            }
            *self.last_payload.lock().unwrap() = Some(record.clone());
            let mut created = record.clone();
            created.id = Some("lst-new".to_string());
            Ok(created)
        }

        async fn update(
            &self,
            id: &str,
            record: &ListingRecord,
        ) -> Result<ListingRecord, WizardError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_submission {
                return Err(WizardError::Submission("backend rejected update".to_string()));
            }
            *self.last_payload.lock().unwrap() = Some(record.clone());
            *self.last_update_id.lock().unwrap() = Some(id.to_string());
            let mut updated = record.clone();
            updated.id = Some(id.to_string());
            Ok(updated)
        }

        async fn delete(&self, _id: &str) -> Result<(), WizardError> {
            Ok(())
        }
    }

    async fn create_mode_wizard() -> ListingWizard<RecordingListingApi> {
        let mut wizard = ListingWizard::new(RecordingListingApi::new());
        wizard
            .initialize(WizardMode::Create)
            .await
            .expect("create mode init cannot fail");
        wizard
    }

    /// Fill the draft so every step passes.
    fn fill_valid_draft(wizard: &mut ListingWizard<RecordingListingApi>) {
        wizard.set_field(Field::Title, "Camera".into());
        wizard.set_field(Field::Category, "cat-1".into());
        wizard.set_field(Field::Condition, "New".into());
        wizard.set_field(Field::Description, "desc".into());
        wizard.set_field(Field::Price, "100".into());
        wizard.set_field(Field::Location, "Mumbai".into());
        wizard.set_field(Field::Images, vec!["front.jpg".to_string()].into());
        wizard.set_field(Field::RentalTerms, "terms".into());
    }

    #[tokio::test]
    async fn create_flow_walks_all_steps_and_creates_once() {
        let mut wizard = create_mode_wizard().await;

        wizard.set_field(Field::Title, "Camera".into());
        wizard.set_field(Field::Category, "cat-1".into());
        wizard.set_field(Field::Condition, "New".into());
        assert_eq!(wizard.go_next().unwrap(), Step::Details);

        wizard.set_field(Field::Description, "desc".into());
        wizard.set_field(Field::Price, "100".into());
        assert_eq!(wizard.go_next().unwrap(), Step::Availability);

        wizard.set_field(Field::Location, "Mumbai".into());
        assert_eq!(wizard.go_next().unwrap(), Step::Media);

        wizard.set_field(Field::Images, vec!["front.jpg".to_string()].into());
        assert_eq!(wizard.go_next().unwrap(), Step::Terms);

        wizard.set_field(Field::RentalTerms, "terms".into());
        assert_eq!(wizard.go_next().unwrap(), Step::Review);

        let outcome = wizard.submit().await.expect("submit should succeed");
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert_eq!(wizard.api.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(wizard.api.update_calls.load(Ordering::SeqCst), 0);

        let payload = wizard.api.last_payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.category_id, "cat-1");
        assert_eq!(payload.price, Some(100.0));

        // Create success resets the wizard for the next listing.
        assert_eq!(wizard.draft(), &ListingDraft::default());
        assert_eq!(wizard.current_step(), Step::BasicInfo);
    }

    #[tokio::test]
    async fn go_next_blocks_until_step_validates() {
        let mut wizard = create_mode_wizard().await;

        let err = wizard.go_next().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            wizard.current_step(),
            Step::BasicInfo,
            "a blocked go_next must not advance"
        );
        let shown = format!("{}", err);
        assert!(shown.contains("title"), "message names missing fields: {}", shown);
        assert!(shown.contains("category"), "message names missing fields: {}", shown);

        wizard.set_field(Field::Title, "Camera".into());
        wizard.set_field(Field::Category, "cat-1".into());
        wizard.set_field(Field::Condition, "New".into());
        assert!(wizard.go_next().is_ok());
    }

    #[tokio::test]
    async fn half_filled_spec_pair_blocks_details_step() {
        let mut wizard = create_mode_wizard().await;
        fill_valid_draft(&mut wizard);
        wizard.go_next().unwrap();

        // Fully-empty row: ignored. Half-filled row: blocks.
        wizard.set_field(
            Field::Specifications,
            vec![SpecPair::new("", ""), SpecPair::new("Size", "")].into(),
        );
        assert!(wizard.go_next().is_err());
        assert_eq!(wizard.current_step(), Step::Details);

        wizard.set_field(
            Field::Specifications,
            vec![SpecPair::new("", ""), SpecPair::new("Size", "XL")].into(),
        );
        assert!(wizard.go_next().is_ok());
    }

    #[tokio::test]
    async fn go_to_step_respects_the_frontier() {
        let mut wizard = create_mode_wizard().await;
        fill_valid_draft(&mut wizard);
        wizard.go_next().unwrap();
        wizard.go_next().unwrap();
        assert_eq!(wizard.current_step(), Step::Availability);

        assert!(
            !wizard.go_to_step(Step::Media),
            "forward jump past the frontier must be a no-op"
        );
        assert_eq!(wizard.current_step(), Step::Availability);

        assert!(wizard.go_to_step(Step::BasicInfo));
        assert_eq!(wizard.current_step(), Step::BasicInfo);
        assert!(wizard.go_to_step(Step::BasicInfo), "jumping in place is allowed");
    }

    #[tokio::test]
    async fn go_prev_clamps_at_the_first_step() {
        let mut wizard = create_mode_wizard().await;
        assert_eq!(wizard.go_prev(), Step::BasicInfo);

        fill_valid_draft(&mut wizard);
        wizard.go_next().unwrap();
        assert_eq!(wizard.go_prev(), Step::BasicInfo);
    }

    #[tokio::test]
    async fn changing_category_clears_subcategory() {
        let mut wizard = create_mode_wizard().await;
        wizard.set_field(Field::Category, "cat-1".into());
        wizard.set_field(Field::Subcategory, "cat-9".into());

        wizard.set_field(Field::Category, "cat-2".into());
        assert_eq!(wizard.draft().subcategory, "");

        wizard.set_field(Field::Subcategory, "cat-15".into());
        wizard.set_field(Field::Category, "cat-2".into());
        assert_eq!(
            wizard.draft().subcategory,
            "cat-15",
            "re-selecting the same category keeps the subcategory"
        );
    }

    #[tokio::test]
    async fn submit_validates_union_of_required_fields() {
        let mut wizard = create_mode_wizard().await;
        fill_valid_draft(&mut wizard);
        wizard.set_field(Field::Location, "".into());

        let err = wizard.submit().await.unwrap_err();
        assert!(err.is_validation());
        assert!(format!("{}", err).contains("location"));
        assert_eq!(
            wizard.api.create_calls.load(Ordering::SeqCst),
            0,
            "nothing may reach the backend on validation failure"
        );
        assert!(!wizard.is_submitting(), "the in-flight flag must be cleared");
    }

    #[tokio::test]
    async fn double_submit_is_a_no_op_while_in_flight() {
        let mut wizard = create_mode_wizard().await;
        fill_valid_draft(&mut wizard);

        wizard.submitting = true;
        let outcome = wizard.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::AlreadyInFlight);
        assert_eq!(
            wizard.api.create_calls.load(Ordering::SeqCst),
            0,
            "a second submit while one is unresolved must not call the backend"
        );
        assert!(
            wizard.is_submitting(),
            "the guard of the unresolved submit must stay set"
        );
    }

    #[tokio::test]
    async fn failed_submission_preserves_state_and_allows_retry() {
        let mut wizard = ListingWizard::new(RecordingListingApi::failing_submission());
        wizard.initialize(WizardMode::Create).await.unwrap();
        fill_valid_draft(&mut wizard);

        let err = wizard.submit().await.unwrap_err();
        assert!(matches!(err, WizardError::Submission(_)));
        assert_eq!(wizard.draft().title, "Camera", "draft must survive the failure");
        assert!(!wizard.is_submitting());

        // Retry goes through to the backend again.
        let _ = wizard.submit().await;
        assert_eq!(wizard.api.create_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn edit_mode_loads_the_record_into_the_draft() {
        let mut record = ListingRecord::default();
        record.id = Some("lst-7".to_string());
        record.title = "Projector".to_string();
        record.category_id = "cat-3".to_string();
        record.price = Some(40.0);
        record.description = "1080p projector".to_string();
        record.location = "Pune".to_string();

        let mut wizard = ListingWizard::new(RecordingListingApi::serving(record));
        wizard
            .initialize(WizardMode::Edit("lst-7".to_string()))
            .await
            .expect("edit init should succeed");

        assert_eq!(wizard.draft().title, "Projector");
        assert_eq!(wizard.draft().category, "cat-3");
        assert_eq!(wizard.draft().price, "40");

        let outcome = wizard.submit().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Updated(_)));
        assert_eq!(
            wizard.api.last_update_id.lock().unwrap().as_deref(),
            Some("lst-7")
        );
        assert_eq!(wizard.api.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            wizard.draft().title,
            "Projector",
            "update success leaves the draft intact"
        );
    }

    #[tokio::test]
    async fn edit_mode_fetch_failure_aborts_initialization() {
        let mut wizard = ListingWizard::new(RecordingListingApi::new());
        let err = wizard
            .initialize(WizardMode::Edit("lst-404".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Fetch(_)));
    }

    #[tokio::test]
    async fn stale_category_snapshots_are_dropped() {
        let mut wizard = create_mode_wizard().await;
        let old_epoch = wizard.epoch();

        wizard.initialize(WizardMode::Create).await.unwrap();

        let stale = vec![CategoryOption {
            label: "Stale".to_string(),
            value: "cat-old".to_string(),
            subcategories: Vec::new(),
        }];
        assert!(
            !wizard.apply_categories(old_epoch, stale),
            "a snapshot from a previous session must be dropped"
        );
        assert!(wizard.categories().is_empty());

        let fresh = vec![CategoryOption {
            label: "Electronics".to_string(),
            value: "cat-1".to_string(),
            subcategories: Vec::new(),
        }];
        assert!(wizard.apply_categories(wizard.epoch(), fresh));
        assert_eq!(wizard.categories().len(), 1);
    }

    #[tokio::test]
    async fn wrong_shaped_payload_is_ignored() {
        let mut wizard = create_mode_wizard().await;
        wizard.set_field(Field::Title, "Camera".into());
        wizard.set_field(Field::Title, true.into());
        assert_eq!(wizard.draft().title, "Camera");
    }
}
