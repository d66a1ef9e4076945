//! Double-booking detection
//!
//! Read-only: the checker never writes. Two reservations conflict when they
//! hold the same resource of the same business, neither is cancelled or
//! deleted, and their `[start, end)` windows share an instant.

use crate::domain::{DomainResult, Reservation, ReservationRepository, TimeRange};

pub struct ConflictChecker<'a> {
    repo: &'a dyn ReservationRepository,
}

impl<'a> ConflictChecker<'a> {
    pub fn new(repo: &'a dyn ReservationRepository) -> Self {
        Self { repo }
    }

    /// Reservations that block `range` on the resource, ordered by start.
    ///
    /// Results from the repository are re-filtered so a store that returns
    /// too much (cancelled rows, another tenant) cannot produce a false
    /// conflict.
    pub async fn conflicts(
        &self,
        resource_id: &str,
        business_id: &str,
        range: &TimeRange,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Reservation>> {
        let candidates = self
            .repo
            .find_overlapping(resource_id, business_id, range.start(), range.end(), exclude_id)
            .await?;

        Ok(candidates
            .into_iter()
            .filter(|r| r.blocks(resource_id, business_id, range, exclude_id))
            .collect())
    }

    pub async fn has_overlap(
        &self,
        resource_id: &str,
        business_id: &str,
        range: &TimeRange,
        exclude_id: Option<&str>,
    ) -> DomainResult<bool> {
        Ok(!self
            .conflicts(resource_id, business_id, range, exclude_id)
            .await?
            .is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    use crate::domain::{
        ContactInfo, ReservationDetails, ReservationFilter, ReservationStatus,
    };
    use crate::infrastructure::storage::InMemoryReservationRepository;
    use crate::shared::{PaginatedResult, PaginationParams};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 2, h, m, 0).unwrap()
    }

    fn window(s: (u32, u32), e: (u32, u32)) -> TimeRange {
        TimeRange::new(at(s.0, s.1), at(e.0, e.1)).unwrap()
    }

    fn booking(business: &str, resource: &str, range: TimeRange) -> Reservation {
        Reservation::new(
            business,
            ReservationDetails {
                resource_id: Some(resource.into()),
                client_id: None,
                contact: ContactInfo {
                    name: "Pablo".into(),
                    email: "pablo@example.com".into(),
                    phone: "611".into(),
                    dni: None,
                },
                range,
                number_of_guests: 4,
                notes: None,
            },
            ReservationStatus::Confirmed,
        )
    }

    /// Returns every stored row regardless of the query
    struct SloppyRepo {
        rows: Vec<Reservation>,
    }

    #[async_trait]
    impl ReservationRepository for SloppyRepo {
        async fn find_overlapping(
            &self,
            _resource_id: &str,
            _business_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _exclude_id: Option<&str>,
        ) -> DomainResult<Vec<Reservation>> {
            Ok(self.rows.clone())
        }

        async fn insert(&self, _reservation: Reservation) -> DomainResult<String> {
            unreachable!("checker must not write")
        }

        async fn find_by_id(&self, _id: &str) -> DomainResult<Option<Reservation>> {
            Ok(None)
        }

        async fn update(&self, _reservation: Reservation) -> DomainResult<()> {
            unreachable!("checker must not write")
        }

        async fn soft_delete(&self, _id: &str) -> DomainResult<()> {
            unreachable!("checker must not write")
        }

        async fn list_by_business(
            &self,
            _business_id: &str,
            _filter: ReservationFilter,
            pagination: PaginationParams,
        ) -> DomainResult<PaginatedResult<Reservation>> {
            Ok(PaginatedResult::new(vec![], 0, pagination.page, pagination.limit))
        }
    }

    #[tokio::test]
    async fn partial_overlap_and_touching_boundaries() {
        let repo = InMemoryReservationRepository::default();
        repo.insert(booking("b1", "t1", window((10, 0), (11, 0))))
            .await
            .unwrap();
        let checker = ConflictChecker::new(&repo);

        assert!(checker
            .has_overlap("t1", "b1", &window((10, 30), (11, 30)), None)
            .await
            .unwrap());
        assert!(!checker
            .has_overlap("t1", "b1", &window((11, 0), (12, 0)), None)
            .await
            .unwrap());
        assert!(!checker
            .has_overlap("t1", "b1", &window((9, 0), (10, 0)), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn other_resource_or_business_never_conflicts() {
        let repo = InMemoryReservationRepository::default();
        repo.insert(booking("b1", "t1", window((10, 0), (11, 0))))
            .await
            .unwrap();
        let checker = ConflictChecker::new(&repo);
        let same = window((10, 0), (11, 0));

        assert!(!checker.has_overlap("t2", "b1", &same, None).await.unwrap());
        assert!(!checker.has_overlap("t1", "b2", &same, None).await.unwrap());
    }

    #[tokio::test]
    async fn excluding_self_allows_unchanged_range() {
        let repo = InMemoryReservationRepository::default();
        let existing = booking("b1", "t1", window((10, 0), (11, 0)));
        let id = repo.insert(existing.clone()).await.unwrap();
        let checker = ConflictChecker::new(&repo);

        assert!(checker
            .has_overlap("t1", "b1", &existing.range, None)
            .await
            .unwrap());
        assert!(!checker
            .has_overlap("t1", "b1", &existing.range, Some(&id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn refilters_what_the_store_returns() {
        let mut cancelled = booking("b1", "t1", window((10, 0), (11, 0)));
        cancelled.cancel();
        let mut deleted = booking("b1", "t1", window((10, 0), (11, 0)));
        deleted.soft_delete();
        let foreign = booking("b2", "t1", window((10, 0), (11, 0)));
        let later = booking("b1", "t1", window((12, 0), (13, 0)));
        let live = booking("b1", "t1", window((10, 45), (11, 15)));

        let repo = SloppyRepo {
            rows: vec![cancelled, deleted, foreign, later, live.clone()],
        };
        let checker = ConflictChecker::new(&repo);
        let found = checker
            .conflicts("t1", "b1", &window((10, 0), (11, 0)), None)
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, live.id);
    }
}
