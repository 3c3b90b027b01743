//! Review creation with therapist aggregate recomputation.

use std::sync::Arc;

use crate::domain::Error;
use crate::domain::ports::{ReviewRepository, TherapistRepository};
use crate::domain::review::{NewReview, Review};

/// Creates reviews and keeps the owning therapist's rating aggregate current.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    therapists: Arc<dyn TherapistRepository>,
}

impl ReviewService {
    /// Build the service over its ports.
    pub fn new(reviews: Arc<dyn ReviewRepository>, therapists: Arc<dyn TherapistRepository>) -> Self {
        Self {
            reviews,
            therapists,
        }
    }

    /// Create a review.
    ///
    /// Rejects a second review of the same therapist by the same author with
    /// a conflict, then recomputes the therapist's average rating and review
    /// count from all stored reviews.
    pub async fn create(&self, review: NewReview) -> Result<Review, Error> {
        if self.therapists.find(review.therapist_id).await?.is_none() {
            return Err(Error::not_found("therapist not found"));
        }
        if self
            .reviews
            .exists(review.user_id, review.therapist_id)
            .await?
        {
            return Err(Error::conflict(
                "you have already reviewed this therapist",
            ));
        }

        let created = self.reviews.create(review).await?;

        let (rating, count) = self.reviews.aggregate_for(created.therapist_id).await?;
        self.therapists
            .set_rating(created.therapist_id, rating, count)
            .await?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{TherapistRepository, UserRepository};
    use crate::domain::review::Rating;
    use crate::domain::therapist::NewTherapist;
    use crate::domain::user::{NewUser, UserRole};
    use crate::outbound::MemoryStore;
    use chrono::NaiveDate;
    use uuid::Uuid;

    async fn seed_therapist(store: &MemoryStore) -> Uuid {
        let user = UserRepository::create(store, NewUser {
                username: "greg".into(),
                email: "greg@example.com".into(),
                phone: None,
                role: UserRole::Therapist,
                profile_image: None,
                password_hash: "$argon2id$stub".into(),
            })
            .await
            .expect("seed user");
        TherapistRepository::create(store, NewTherapist {
                user_id: user.id,
                specialty: "CBT".into(),
                experience_years: 5,
                available: true,
                price_cents: 8000,
                languages: vec![],
                specializations: vec![],
                education: vec![],
                about: String::new(),
                schedule: vec![],
            })
            .await
            .expect("seed therapist")
            .id
    }

    async fn seed_client(store: &MemoryStore, email: &str) -> Uuid {
        UserRepository::create(store, NewUser {
                username: email.split('@').next().unwrap_or("client").into(),
                email: email.into(),
                phone: None,
                role: UserRole::Client,
                profile_image: None,
                password_hash: "$argon2id$stub".into(),
            })
            .await
            .expect("seed client")
            .id
    }

    fn review_for(user_id: Uuid, therapist_id: Uuid, rating: i16) -> NewReview {
        NewReview {
            user_id,
            therapist_id,
            rating: Rating::new(rating).expect("valid rating"),
            comment: "helped a lot".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
        }
    }

    fn service(store: &MemoryStore) -> ReviewService {
        ReviewService::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn create_recomputes_the_aggregate() {
        let store = MemoryStore::new();
        let therapist_id = seed_therapist(&store).await;
        let ada = seed_client(&store, "ada@example.com").await;
        let bob = seed_client(&store, "bob@example.com").await;
        let service = service(&store);

        service
            .create(review_for(ada, therapist_id, 5))
            .await
            .expect("first review");
        service
            .create(review_for(bob, therapist_id, 2))
            .await
            .expect("second review");

        let therapist = TherapistRepository::find(&store, therapist_id)
            .await
            .expect("lookup")
            .expect("therapist");
        assert_eq!(therapist.reviews_count, 2);
        assert!((therapist.rating - 3.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn second_review_by_same_author_conflicts() {
        let store = MemoryStore::new();
        let therapist_id = seed_therapist(&store).await;
        let ada = seed_client(&store, "ada@example.com").await;
        let service = service(&store);

        service
            .create(review_for(ada, therapist_id, 5))
            .await
            .expect("first review");
        let err = service
            .create(review_for(ada, therapist_id, 1))
            .await
            .expect_err("duplicate review");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn unknown_therapist_is_not_found() {
        let store = MemoryStore::new();
        let ada = seed_client(&store, "ada@example.com").await;
        let service = service(&store);

        let err = service
            .create(review_for(ada, Uuid::new_v4(), 4))
            .await
            .expect_err("missing therapist");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
