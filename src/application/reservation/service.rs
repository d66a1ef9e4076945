//! Reservation service: application-layer orchestration
//!
//! HTTP handlers are thin wrappers around this service. Every operation is
//! scoped to one business: a reservation owned by another business is
//! reported as `NotFound`, never as `Forbidden`, so ids do not leak across
//! tenants.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::conflict::ConflictChecker;
use crate::application::events::{Event, SharedEventBus};
use crate::application::ports::{NotificationPort, Recipient};
use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, Reservation, ReservationDetails,
    ReservationFilter, ReservationInput, ReservationStatus, Resource, TimeRange,
};
use crate::shared::{is_plausible_email, PaginatedResult, PaginationParams};

/// Tunables read from the `[reservations]` config section
#[derive(Debug, Clone)]
pub struct ReservationPolicy {
    /// New bookings start as `Pending` and need an explicit confirm
    pub require_approval: bool,
    /// Upper bound for a single guest notification
    pub notification_timeout: Duration,
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            require_approval: false,
            notification_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of a cancel request. Cancelling twice is not an error.
#[derive(Debug, Clone)]
pub enum CancelOutcome {
    Cancelled(Reservation),
    AlreadyCancelled(Reservation),
}

impl CancelOutcome {
    pub fn reservation(&self) -> &Reservation {
        match self {
            Self::Cancelled(r) | Self::AlreadyCancelled(r) => r,
        }
    }

    pub fn into_reservation(self) -> Reservation {
        match self {
            Self::Cancelled(r) | Self::AlreadyCancelled(r) => r,
        }
    }

    pub fn was_already_cancelled(&self) -> bool {
        matches!(self, Self::AlreadyCancelled(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum Notice {
    Confirmation,
    Cancellation,
}

impl Notice {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmation => "confirmation",
            Self::Cancellation => "cancellation",
        }
    }
}

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    notifier: Arc<dyn NotificationPort>,
    event_bus: SharedEventBus,
    policy: ReservationPolicy,
}

impl ReservationService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: Arc<dyn NotificationPort>,
        event_bus: SharedEventBus,
        policy: ReservationPolicy,
    ) -> Self {
        Self {
            repos,
            notifier,
            event_bus,
            policy,
        }
    }

    fn checker(&self) -> ConflictChecker<'_> {
        ConflictChecker::new(self.repos.reservations())
    }

    // ── Commands ────────────────────────────────────────────────

    pub async fn create(
        &self,
        business_id: &str,
        input: ReservationInput,
    ) -> DomainResult<Reservation> {
        let details = validate_input(input)?;

        self.require_open_business(business_id).await?;
        self.check_booking(business_id, &details, None).await?;

        let status = if self.policy.require_approval {
            ReservationStatus::Pending
        } else {
            ReservationStatus::Confirmed
        };
        let reservation = Reservation::new(business_id, details, status);

        self.repos
            .reservations()
            .insert(reservation.clone())
            .await
            .inspect_err(count_conflict)?;

        metrics::counter!("reservations_created_total", "status" => status.as_str())
            .increment(1);
        info!(
            reservation_id = %reservation.id,
            business_id,
            resource_id = ?reservation.resource_id,
            status = %reservation.status,
            "Reservation created"
        );

        self.notify(Notice::Confirmation, &reservation);
        self.event_bus
            .publish(Event::ReservationCreated((&reservation).into()));
        Ok(reservation)
    }

    /// Replace the bookable attributes; status is kept.
    pub async fn update(
        &self,
        business_id: &str,
        id: &str,
        input: ReservationInput,
    ) -> DomainResult<Reservation> {
        let details = validate_input(input)?;

        let mut reservation = self.load_open(business_id, id).await?;
        self.check_booking(business_id, &details, Some(id)).await?;

        reservation.apply(details);
        self.repos
            .reservations()
            .update(reservation.clone())
            .await
            .inspect_err(count_conflict)?;

        info!(reservation_id = %id, business_id, "Reservation updated");
        self.event_bus
            .publish(Event::ReservationUpdated((&reservation).into()));
        Ok(reservation)
    }

    /// Pending -> Confirmed. Already confirmed is a no-op success.
    pub async fn confirm(&self, business_id: &str, id: &str) -> DomainResult<Reservation> {
        let mut reservation = self.load_open(business_id, id).await?;

        if !reservation.confirm() {
            debug!(reservation_id = %id, "Reservation already confirmed");
            return Ok(reservation);
        }

        self.repos
            .reservations()
            .update(reservation.clone())
            .await
            .inspect_err(count_conflict)?;

        info!(reservation_id = %id, business_id, "Reservation confirmed");
        self.event_bus
            .publish(Event::ReservationConfirmed((&reservation).into()));
        Ok(reservation)
    }

    /// Move to Cancelled and tell the guest. Idempotent.
    pub async fn cancel(&self, business_id: &str, id: &str) -> DomainResult<CancelOutcome> {
        let mut reservation = self.load(business_id, id).await?;

        if !reservation.cancel() {
            debug!(reservation_id = %id, "Reservation already cancelled");
            return Ok(CancelOutcome::AlreadyCancelled(reservation));
        }

        match self.repos.reservations().update(reservation.clone()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                // a concurrent cancel got there first; a concurrent delete stays NotFound
                let current = self.load(business_id, id).await?;
                if current.is_cancelled() {
                    return Ok(CancelOutcome::AlreadyCancelled(current));
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        }

        metrics::counter!("reservations_cancelled_total").increment(1);
        info!(reservation_id = %id, business_id, "Reservation cancelled");

        self.notify(Notice::Cancellation, &reservation);
        self.event_bus
            .publish(Event::ReservationCancelled((&reservation).into()));
        Ok(CancelOutcome::Cancelled(reservation))
    }

    /// Soft delete. The row is kept with `deleted_at` set and disappears
    /// from every read and from conflict checks.
    pub async fn delete(&self, business_id: &str, id: &str) -> DomainResult<()> {
        let reservation = self.load(business_id, id).await?;

        self.repos.reservations().soft_delete(&reservation.id).await?;

        info!(reservation_id = %id, business_id, "Reservation deleted");
        self.event_bus
            .publish(Event::ReservationDeleted((&reservation).into()));
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get(&self, business_id: &str, id: &str) -> DomainResult<Reservation> {
        self.load(business_id, id).await
    }

    pub async fn list(
        &self,
        business_id: &str,
        filter: ReservationFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to <= from {
                return Err(DomainError::Validation(
                    "'to' must be after 'from'".into(),
                ));
            }
        }
        self.repos
            .reservations()
            .list_by_business(business_id, filter, pagination)
            .await
    }

    // ── Helpers ─────────────────────────────────────────────────

    /// Live reservation of this business
    async fn load(&self, business_id: &str, id: &str) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_id(id)
            .await?
            .filter(|r| r.business_id == business_id && !r.is_deleted())
            .ok_or_else(|| DomainError::not_found("Reservation", id))
    }

    /// Live and not cancelled; cancelled reservations cannot be edited
    async fn load_open(&self, business_id: &str, id: &str) -> DomainResult<Reservation> {
        let reservation = self.load(business_id, id).await?;
        if reservation.is_cancelled() {
            return Err(DomainError::not_found("Reservation", id));
        }
        Ok(reservation)
    }

    async fn require_open_business(&self, business_id: &str) -> DomainResult<()> {
        self.repos
            .businesses()
            .find_by_id(business_id)
            .await?
            .filter(|b| b.accepts_bookings())
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Business", business_id))
    }

    async fn bookable_resource(
        &self,
        business_id: &str,
        resource_id: &str,
    ) -> DomainResult<Resource> {
        let resource = self
            .repos
            .resources()
            .find_by_id(resource_id)
            .await?
            .filter(|r| r.business_id == business_id && r.deleted_at.is_none())
            .ok_or_else(|| DomainError::not_found("Resource", resource_id))?;

        if !resource.is_active {
            return Err(DomainError::Validation(format!(
                "{} '{}' is not accepting reservations",
                resource.kind, resource.name
            )));
        }
        Ok(resource)
    }

    /// Resource ownership, capacity and overlap. Walk-ins skip all three.
    async fn check_booking(
        &self,
        business_id: &str,
        details: &ReservationDetails,
        exclude_id: Option<&str>,
    ) -> DomainResult<()> {
        let Some(resource_id) = details.resource_id.as_deref() else {
            return Ok(());
        };

        let resource = self.bookable_resource(business_id, resource_id).await?;
        resource.check_capacity(details.number_of_guests)?;

        if self
            .checker()
            .has_overlap(resource_id, business_id, &details.range, exclude_id)
            .await?
        {
            metrics::counter!("reservation_conflicts_total").increment(1);
            return Err(DomainError::Conflict(format!(
                "{} '{}' is already booked between {} and {}",
                resource.kind,
                resource.name,
                details.range.start().to_rfc3339(),
                details.range.end().to_rfc3339()
            )));
        }
        Ok(())
    }

    /// Fire-and-forget: runs detached, bounded by the policy timeout, and
    /// only ever logs.
    fn notify(&self, notice: Notice, reservation: &Reservation) {
        let notifier = self.notifier.clone();
        let reservation = reservation.clone();
        let timeout = self.policy.notification_timeout;

        tokio::spawn(async move {
            let recipient = Recipient::from(&reservation.contact);
            let send = async {
                match notice {
                    Notice::Confirmation => {
                        notifier.send_confirmation(&recipient, &reservation).await
                    }
                    Notice::Cancellation => {
                        notifier.send_cancellation(&recipient, &reservation).await
                    }
                }
            };

            let failure = match tokio::time::timeout(timeout, send).await {
                Ok(Ok(())) => {
                    debug!(reservation_id = %reservation.id, kind = notice.as_str(), "Guest notified");
                    return;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {:?}", timeout),
            };

            metrics::counter!("reservation_notifications_failed_total", "kind" => notice.as_str())
                .increment(1);
            warn!(
                reservation_id = %reservation.id,
                kind = notice.as_str(),
                error = %failure,
                "Guest notification failed"
            );
        });
    }
}

fn count_conflict(e: &DomainError) {
    if matches!(e, DomainError::Conflict(_)) {
        metrics::counter!("reservation_conflicts_total").increment(1);
    }
}

/// Everything that can be checked without touching storage.
fn validate_input(input: ReservationInput) -> DomainResult<ReservationDetails> {
    let range = TimeRange::new(input.start_at, input.end_at)?;

    if input.number_of_guests < 1 {
        return Err(DomainError::Validation(
            "number_of_guests must be at least 1".into(),
        ));
    }
    if input.contact.name.trim().is_empty() {
        return Err(DomainError::Validation("Contact name is required".into()));
    }
    if !is_plausible_email(&input.contact.email) {
        return Err(DomainError::Validation(format!(
            "Invalid contact email: {}",
            input.contact.email
        )));
    }

    Ok(ReservationDetails {
        resource_id: input.resource_id,
        client_id: input.client_id,
        contact: input.contact,
        range,
        number_of_guests: input.number_of_guests,
        notes: input.notes,
    })
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use tokio::sync::mpsc;

    use super::*;
    use crate::application::events::create_event_bus;
    use crate::application::ports::NotificationError;
    use crate::domain::{
        Business, BusinessDraft, BusinessRepository, ContactInfo, ReservationRepository,
        ResourceDraft, ResourceKind, ResourceRepository, UserRepositoryInterface,
    };
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    // ── Fixtures ────────────────────────────────────────────────

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Confirmation(String),
        Cancellation(String),
    }

    struct RecordingNotifier {
        tx: mpsc::UnboundedSender<Sent>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationPort for RecordingNotifier {
        async fn send_confirmation(
            &self,
            _recipient: &Recipient,
            reservation: &Reservation,
        ) -> Result<(), NotificationError> {
            let _ = self.tx.send(Sent::Confirmation(reservation.id.clone()));
            if self.fail {
                return Err(NotificationError::Transport("smtp down".into()));
            }
            Ok(())
        }

        async fn send_cancellation(
            &self,
            _recipient: &Recipient,
            reservation: &Reservation,
        ) -> Result<(), NotificationError> {
            let _ = self.tx.send(Sent::Cancellation(reservation.id.clone()));
            if self.fail {
                return Err(NotificationError::Transport("smtp down".into()));
            }
            Ok(())
        }
    }

    /// Counts every repository access
    struct CountingProvider {
        inner: InMemoryRepositoryProvider,
        calls: AtomicUsize,
    }

    impl RepositoryProvider for CountingProvider {
        fn businesses(&self) -> &dyn BusinessRepository {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.businesses()
        }
        fn resources(&self) -> &dyn ResourceRepository {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.resources()
        }
        fn reservations(&self) -> &dyn ReservationRepository {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.reservations()
        }
        fn users(&self) -> &dyn UserRepositoryInterface {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.users()
        }
    }

    /// What another request commits just before the next `update` lands
    #[derive(Clone, Copy)]
    enum Interleave {
        Cancel,
        Delete,
    }

    /// In-memory reservations where a competing write sneaks in between the
    /// service's read and its `update`.
    #[derive(Default)]
    struct RacedReservations {
        inner: crate::infrastructure::storage::InMemoryReservationRepository,
        pending: std::sync::Mutex<Option<Interleave>>,
    }

    #[async_trait]
    impl ReservationRepository for RacedReservations {
        async fn find_overlapping(
            &self,
            resource_id: &str,
            business_id: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            exclude_id: Option<&str>,
        ) -> DomainResult<Vec<Reservation>> {
            self.inner
                .find_overlapping(resource_id, business_id, start, end, exclude_id)
                .await
        }

        async fn insert(&self, reservation: Reservation) -> DomainResult<String> {
            self.inner.insert(reservation).await
        }

        async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>> {
            self.inner.find_by_id(id).await
        }

        async fn update(&self, reservation: Reservation) -> DomainResult<()> {
            let interleave = self.pending.lock().unwrap().take();
            match interleave {
                Some(Interleave::Cancel) => {
                    let mut other = self.inner.find_by_id(&reservation.id).await?.unwrap();
                    other.cancel();
                    self.inner.update(other).await?;
                }
                Some(Interleave::Delete) => self.inner.soft_delete(&reservation.id).await?,
                None => {}
            }
            self.inner.update(reservation).await
        }

        async fn soft_delete(&self, id: &str) -> DomainResult<()> {
            self.inner.soft_delete(id).await
        }

        async fn list_by_business(
            &self,
            business_id: &str,
            filter: ReservationFilter,
            pagination: PaginationParams,
        ) -> DomainResult<PaginatedResult<Reservation>> {
            self.inner
                .list_by_business(business_id, filter, pagination)
                .await
        }
    }

    struct RacedProvider {
        inner: InMemoryRepositoryProvider,
        reservations: RacedReservations,
    }

    impl RepositoryProvider for RacedProvider {
        fn businesses(&self) -> &dyn BusinessRepository {
            self.inner.businesses()
        }
        fn resources(&self) -> &dyn ResourceRepository {
            self.inner.resources()
        }
        fn reservations(&self) -> &dyn ReservationRepository {
            &self.reservations
        }
        fn users(&self) -> &dyn UserRepositoryInterface {
            self.inner.users()
        }
    }

    struct RacedFixture {
        service: ReservationService,
        repos: Arc<RacedProvider>,
        business_id: String,
        table_id: String,
    }

    impl RacedFixture {
        async fn new(policy: ReservationPolicy) -> Self {
            let inner = InMemoryRepositoryProvider::new();
            let (business_id, table_id) = seed(&inner).await;
            let repos = Arc::new(RacedProvider {
                inner,
                reservations: RacedReservations::default(),
            });
            let (tx, _rx) = mpsc::unbounded_channel();
            let service = ReservationService::new(
                repos.clone(),
                Arc::new(RecordingNotifier { tx, fail: false }),
                create_event_bus(),
                policy,
            );
            Self {
                service,
                repos,
                business_id,
                table_id,
            }
        }

        fn next_update_loses_to(&self, interleave: Interleave) {
            *self.repos.reservations.pending.lock().unwrap() = Some(interleave);
        }

        async fn stored(&self, id: &str) -> Reservation {
            self.repos
                .reservations
                .find_by_id(id)
                .await
                .unwrap()
                .unwrap()
        }
    }

    struct Fixture {
        service: Arc<ReservationService>,
        repos: Arc<InMemoryRepositoryProvider>,
        sent: mpsc::UnboundedReceiver<Sent>,
        business_id: String,
        table_id: String,
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 7, 1, h, m, 0).unwrap()
    }

    fn input(resource: Option<&str>, start: (u32, u32), end: (u32, u32)) -> ReservationInput {
        ReservationInput {
            resource_id: resource.map(String::from),
            client_id: None,
            contact: ContactInfo {
                name: "Carmen".into(),
                email: "carmen@example.com".into(),
                phone: "+34 611 222 333".into(),
                dni: None,
            },
            start_at: at(start.0, start.1),
            end_at: at(end.0, end.1),
            number_of_guests: 2,
            notes: None,
        }
    }

    async fn seed(repos: &InMemoryRepositoryProvider) -> (String, String) {
        let business = Business::new(BusinessDraft {
            name: "La Tasca".into(),
            slug: "la-tasca".into(),
            email: None,
            phone: None,
            address: None,
            is_active: true,
        });
        repos.businesses().insert(business.clone()).await.unwrap();

        let table = Resource::new(
            business.id.clone(),
            ResourceDraft {
                kind: ResourceKind::Table,
                name: "T1".into(),
                min_capacity: Some(1),
                max_capacity: Some(4),
                is_active: true,
            },
        );
        repos.resources().insert(table.clone()).await.unwrap();
        (business.id, table.id)
    }

    async fn fixture_with(policy: ReservationPolicy, fail_notifications: bool) -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let (business_id, table_id) = seed(&repos).await;
        let (tx, sent) = mpsc::unbounded_channel();
        let notifier = Arc::new(RecordingNotifier {
            tx,
            fail: fail_notifications,
        });
        let service = Arc::new(ReservationService::new(
            repos.clone(),
            notifier,
            create_event_bus(),
            policy,
        ));
        Fixture {
            service,
            repos,
            sent,
            business_id,
            table_id,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(ReservationPolicy::default(), false).await
    }

    /// Let detached notification tasks run.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    // ── Create ──────────────────────────────────────────────────

    #[tokio::test]
    async fn overlapping_create_conflicts_and_touching_succeeds() {
        let f = fixture().await;
        let table = Some(f.table_id.as_str());

        f.service
            .create(&f.business_id, input(table, (10, 0), (11, 0)))
            .await
            .unwrap();

        let err = f
            .service
            .create(&f.business_id, input(table, (10, 30), (11, 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let next = f
            .service
            .create(&f.business_id, input(table, (11, 0), (12, 0)))
            .await
            .unwrap();
        assert_eq!(next.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_storage() {
        let repos = Arc::new(CountingProvider {
            inner: InMemoryRepositoryProvider::new(),
            calls: AtomicUsize::new(0),
        });
        let (tx, _rx) = mpsc::unbounded_channel();
        let service = ReservationService::new(
            repos.clone(),
            Arc::new(RecordingNotifier { tx, fail: false }),
            create_event_bus(),
            ReservationPolicy::default(),
        );

        let mut no_guests = input(Some("t1"), (10, 0), (11, 0));
        no_guests.number_of_guests = 0;
        let inverted = input(Some("t1"), (11, 0), (10, 0));
        let empty = input(Some("t1"), (10, 0), (10, 0));
        let mut bad_email = input(None, (10, 0), (11, 0));
        bad_email.contact.email = "nope".into();

        for bad in [no_guests, inverted, empty, bad_email] {
            let err = service.create("b1", bad).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
        assert_eq!(repos.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn walk_ins_skip_overlap_checks() {
        let f = fixture().await;
        for _ in 0..3 {
            f.service
                .create(&f.business_id, input(None, (20, 0), (22, 0)))
                .await
                .unwrap();
        }
        let page = f
            .service
            .list(&f.business_id, ReservationFilter::default(), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn capacity_and_ownership_are_enforced() {
        let f = fixture().await;

        let mut crowd = input(Some(f.table_id.as_str()), (10, 0), (11, 0));
        crowd.number_of_guests = 9;
        assert!(matches!(
            f.service.create(&f.business_id, crowd).await,
            Err(DomainError::Validation(_))
        ));

        assert!(matches!(
            f.service
                .create(&f.business_id, input(Some("missing"), (10, 0), (11, 0)))
                .await,
            Err(DomainError::NotFound { .. })
        ));

        assert!(matches!(
            f.service
                .create("other-business", input(None, (10, 0), (11, 0)))
                .await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn approval_policy_creates_pending() {
        let f = fixture_with(
            ReservationPolicy {
                require_approval: true,
                ..Default::default()
            },
            false,
        )
        .await;

        let r = f
            .service
            .create(&f.business_id, input(Some(f.table_id.as_str()), (10, 0), (11, 0)))
            .await
            .unwrap();
        assert_eq!(r.status, ReservationStatus::Pending);

        let confirmed = f.service.confirm(&f.business_id, &r.id).await.unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);
        let again = f.service.confirm(&f.business_id, &r.id).await.unwrap();
        assert_eq!(again.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_create() {
        let mut f = fixture_with(ReservationPolicy::default(), true).await;

        let r = f
            .service
            .create(&f.business_id, input(Some(f.table_id.as_str()), (10, 0), (11, 0)))
            .await
            .unwrap();

        settle().await;
        assert_eq!(f.sent.try_recv().unwrap(), Sent::Confirmation(r.id.clone()));
        assert!(f.service.get(&f.business_id, &r.id).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_for_one_slot_book_once() {
        let f = fixture().await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = f.service.clone();
            let business_id = f.business_id.clone();
            let table_id = f.table_id.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create(&business_id, input(Some(table_id.as_str()), (19, 0), (21, 0)))
                    .await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(matches!(e, DomainError::Conflict(_))),
            }
        }
        assert_eq!(ok, 1);
    }

    // ── Cancel / update / delete ────────────────────────────────

    #[tokio::test]
    async fn cancel_twice_is_idempotent_and_notifies_once() {
        let mut f = fixture().await;
        let r = f
            .service
            .create(&f.business_id, input(Some(f.table_id.as_str()), (10, 0), (11, 0)))
            .await
            .unwrap();
        settle().await;
        assert_eq!(f.sent.try_recv().unwrap(), Sent::Confirmation(r.id.clone()));

        let first = f.service.cancel(&f.business_id, &r.id).await.unwrap();
        assert!(!first.was_already_cancelled());
        let cancelled_at = first.reservation().cancelled_at;
        assert!(cancelled_at.is_some());

        let second = f.service.cancel(&f.business_id, &r.id).await.unwrap();
        assert!(second.was_already_cancelled());
        assert_eq!(second.reservation().status, ReservationStatus::Cancelled);
        assert_eq!(second.reservation().cancelled_at, cancelled_at);

        settle().await;
        assert_eq!(f.sent.try_recv().unwrap(), Sent::Cancellation(r.id.clone()));
        assert!(f.sent.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancelled_slot_can_be_booked_again() {
        let f = fixture().await;
        let table = Some(f.table_id.as_str());
        let r = f
            .service
            .create(&f.business_id, input(table, (10, 0), (11, 0)))
            .await
            .unwrap();
        f.service.cancel(&f.business_id, &r.id).await.unwrap();

        f.service
            .create(&f.business_id, input(table, (10, 0), (11, 0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_keeps_slot_and_status() {
        let f = fixture().await;
        let table = Some(f.table_id.as_str());
        let r = f
            .service
            .create(&f.business_id, input(table, (10, 0), (11, 0)))
            .await
            .unwrap();

        let mut same_range = input(table, (10, 0), (11, 0));
        same_range.number_of_guests = 3;
        let updated = f
            .service
            .update(&f.business_id, &r.id, same_range)
            .await
            .unwrap();
        assert_eq!(updated.number_of_guests, 3);
        assert_eq!(updated.status, ReservationStatus::Confirmed);
        assert_eq!(updated.created_at, r.created_at);

        let other = f
            .service
            .create(&f.business_id, input(table, (12, 0), (13, 0)))
            .await
            .unwrap();
        let err = f
            .service
            .update(&f.business_id, &other.id, input(table, (10, 30), (12, 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn cancelled_reservations_cannot_be_edited() {
        let f = fixture().await;
        let r = f
            .service
            .create(&f.business_id, input(None, (10, 0), (11, 0)))
            .await
            .unwrap();
        f.service.cancel(&f.business_id, &r.id).await.unwrap();

        assert!(f
            .service
            .update(&f.business_id, &r.id, input(None, (12, 0), (13, 0)))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(f
            .service
            .confirm(&f.business_id, &r.id)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn delete_hides_reservation_and_frees_slot() {
        let f = fixture().await;
        let table = Some(f.table_id.as_str());
        let r = f
            .service
            .create(&f.business_id, input(table, (10, 0), (11, 0)))
            .await
            .unwrap();

        f.service.delete(&f.business_id, &r.id).await.unwrap();

        assert!(f.service.get(&f.business_id, &r.id).await.unwrap_err().is_not_found());
        assert!(f.service.delete(&f.business_id, &r.id).await.unwrap_err().is_not_found());
        let stored = f.repos.reservations().find_by_id(&r.id).await.unwrap().unwrap();
        assert!(stored.is_deleted());
        assert_eq!(stored.status, ReservationStatus::Confirmed);

        f.service
            .create(&f.business_id, input(table, (10, 0), (11, 0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn other_business_sees_not_found() {
        let f = fixture().await;
        let r = f
            .service
            .create(&f.business_id, input(None, (10, 0), (11, 0)))
            .await
            .unwrap();

        assert!(f.service.get("intruder", &r.id).await.unwrap_err().is_not_found());
        assert!(f.service.cancel("intruder", &r.id).await.unwrap_err().is_not_found());
        assert!(f.service.delete("intruder", &r.id).await.unwrap_err().is_not_found());
        assert!(f.service.get("intruder", "no-such-id").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_filters_by_status_and_orders_by_start() {
        let f = fixture().await;
        let table = Some(f.table_id.as_str());
        let late = f
            .service
            .create(&f.business_id, input(table, (20, 0), (21, 0)))
            .await
            .unwrap();
        let early = f
            .service
            .create(&f.business_id, input(table, (8, 0), (9, 0)))
            .await
            .unwrap();
        f.service.cancel(&f.business_id, &late.id).await.unwrap();

        let all = f
            .service
            .list(&f.business_id, ReservationFilter::default(), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(all.items[0].id, early.id);
        assert_eq!(all.items[1].id, late.id);

        let cancelled = f
            .service
            .list(
                &f.business_id,
                ReservationFilter {
                    status: Some(ReservationStatus::Cancelled),
                    ..Default::default()
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(cancelled.total, 1);
        assert_eq!(cancelled.items[0].id, late.id);
    }

    // ── Interleaved writers ─────────────────────────────────────

    #[tokio::test]
    async fn update_racing_a_cancel_keeps_it_cancelled() {
        let f = RacedFixture::new(ReservationPolicy::default()).await;
        let table = Some(f.table_id.as_str());
        let r = f
            .service
            .create(&f.business_id, input(table, (10, 0), (11, 0)))
            .await
            .unwrap();

        f.next_update_loses_to(Interleave::Cancel);
        let mut bigger = input(table, (10, 0), (11, 0));
        bigger.number_of_guests = 4;
        let err = f
            .service
            .update(&f.business_id, &r.id, bigger)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let stored = f.stored(&r.id).await;
        assert_eq!(stored.status, ReservationStatus::Cancelled);
        assert!(stored.cancelled_at.is_some());
        assert_eq!(stored.number_of_guests, 2);
    }

    #[tokio::test]
    async fn confirm_racing_a_delete_keeps_it_deleted() {
        let f = RacedFixture::new(ReservationPolicy {
            require_approval: true,
            ..Default::default()
        })
        .await;
        let r = f
            .service
            .create(&f.business_id, input(Some(f.table_id.as_str()), (10, 0), (11, 0)))
            .await
            .unwrap();

        f.next_update_loses_to(Interleave::Delete);
        assert!(f
            .service
            .confirm(&f.business_id, &r.id)
            .await
            .unwrap_err()
            .is_not_found());

        let stored = f.stored(&r.id).await;
        assert!(stored.is_deleted());
        assert_eq!(stored.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn cancel_racing_a_cancel_reports_already_cancelled() {
        let f = RacedFixture::new(ReservationPolicy::default()).await;
        let r = f
            .service
            .create(&f.business_id, input(None, (10, 0), (11, 0)))
            .await
            .unwrap();

        f.next_update_loses_to(Interleave::Cancel);
        let outcome = f.service.cancel(&f.business_id, &r.id).await.unwrap();
        assert!(outcome.was_already_cancelled());

        let first_cancel = f.stored(&r.id).await.cancelled_at;
        assert_eq!(outcome.reservation().cancelled_at, first_cancel);
    }
}
