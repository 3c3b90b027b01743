//! In-memory adapter implementing every repository port.
//!
//! Backs the server when no database is configured and the handler test
//! suites. Shares the Diesel adapter's semantics: uniqueness violations,
//! cascade deletes and visibility scoping behave identically so tests
//! exercised here describe the persistent implementation too.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::appointment::{
    Appointment, AppointmentFilter, AppointmentKind, AppointmentPatch, AppointmentStatus,
    NewAppointment, NewPayment, Payment, PaymentStatus,
};
use crate::domain::category::{Category, CategoryPatch, NewCategory};
use crate::domain::event::{Event, EventCategory, EventFilter, EventPatch, EventRegistration, NewEvent};
use crate::domain::message::{Conversation, Message, MessageFilter, NewMessage};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::ports::{
    AppointmentRepository, CategoryRepository, EventRepository, MessageRepository,
    NotificationRepository, ProgressRepository, ReadingListRepository, RepositoryError,
    ResourceRepository, ReviewRepository, StatsRepository, TherapistRepository, UserRepository,
};
use crate::domain::progress::{NewProgressEntry, ProgressEntry, ProgressFilter, ProgressPatch};
use crate::domain::reading_list::{
    NewReadingList, ReadingList, ReadingListFilter, ReadingListItem, ReadingListPatch,
};
use crate::domain::resource::{NewResource, Resource, ResourceFilter, ResourcePatch};
use crate::domain::review::{NewReview, Rating, Review, ReviewFilter, ReviewPatch};
use crate::domain::stats::{AdminStats, NewAdminStats};
use crate::domain::therapist::{
    NewScheduleSlot, NewTherapist, ScheduleSlot, SlotTime, Therapist, TherapistFilter,
    TherapistPatch, Weekday,
};
use crate::domain::user::{NewUser, User, UserFilter, UserPatch, UserRole, Viewer};

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct TherapistRecord {
    id: Uuid,
    user_id: Uuid,
    specialty: String,
    experience_years: i32,
    available: bool,
    price_cents: i32,
    languages: Vec<String>,
    specializations: Vec<String>,
    education: Vec<String>,
    about: String,
    rating: f64,
    reviews_count: i32,
}

#[derive(Debug, Clone)]
struct SlotRecord {
    id: Uuid,
    therapist_id: Uuid,
    day: Weekday,
    time: SlotTime,
    available: bool,
}

#[derive(Debug, Clone)]
struct AppointmentRecord {
    id: Uuid,
    user_id: Uuid,
    therapist_id: Uuid,
    date: NaiveDate,
    time: SlotTime,
    status: AppointmentStatus,
    kind: AppointmentKind,
    notes: String,
    duration_minutes: i32,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct EventRecord {
    id: Uuid,
    title: String,
    date: NaiveDate,
    time: String,
    location: String,
    category: EventCategory,
    capacity: i32,
    description: String,
    presenter: String,
    price_cents: i32,
    image: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct RegistrationRecord {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    registered_at: chrono::DateTime<Utc>,
    payment_status: PaymentStatus,
}

#[derive(Debug, Clone)]
struct ReviewRecord {
    id: Uuid,
    user_id: Uuid,
    therapist_id: Uuid,
    rating: Rating,
    comment: String,
    date: NaiveDate,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ReadingListRecord {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    image: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ItemRecord {
    id: Uuid,
    reading_list_id: Uuid,
    title: String,
    position: i32,
}

#[derive(Debug, Clone)]
struct MessageRecord {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    body: String,
    sent_at: chrono::DateTime<Utc>,
    read: bool,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, UserRecord>,
    therapists: HashMap<Uuid, TherapistRecord>,
    slots: Vec<SlotRecord>,
    appointments: HashMap<Uuid, AppointmentRecord>,
    payments: HashMap<Uuid, Payment>,
    reviews: HashMap<Uuid, ReviewRecord>,
    resources: HashMap<Uuid, Resource>,
    events: HashMap<Uuid, EventRecord>,
    registrations: Vec<RegistrationRecord>,
    reading_lists: HashMap<Uuid, ReadingListRecord>,
    reading_list_items: Vec<ItemRecord>,
    categories: HashMap<Uuid, Category>,
    notifications: HashMap<Uuid, Notification>,
    messages: HashMap<Uuid, MessageRecord>,
    progress: HashMap<Uuid, ProgressEntry>,
    stats: HashMap<NaiveDate, AdminStats>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl Inner {
    fn username(&self, id: Uuid) -> String {
        self.users
            .get(&id)
            .map(|record| record.user.username.clone())
            .unwrap_or_default()
    }

    fn therapist_username(&self, therapist_id: Uuid) -> String {
        self.therapists
            .get(&therapist_id)
            .map(|record| self.username(record.user_id))
            .unwrap_or_default()
    }

    fn hydrate_therapist(&self, record: &TherapistRecord) -> Option<Therapist> {
        let user = self.users.get(&record.user_id)?.user.clone();
        let mut time_slots: Vec<ScheduleSlot> = self
            .slots
            .iter()
            .filter(|slot| slot.therapist_id == record.id)
            .map(|slot| ScheduleSlot {
                id: slot.id,
                day: slot.day,
                time: slot.time.clone(),
                available: slot.available,
            })
            .collect();
        time_slots.sort_by(|a, b| (a.day, a.time.clone()).cmp(&(b.day, b.time.clone())));
        Some(Therapist {
            id: record.id,
            user,
            specialty: record.specialty.clone(),
            experience_years: record.experience_years,
            available: record.available,
            price_cents: record.price_cents,
            languages: record.languages.clone(),
            specializations: record.specializations.clone(),
            education: record.education.clone(),
            about: record.about.clone(),
            rating: record.rating,
            reviews_count: record.reviews_count,
            time_slots,
        })
    }

    fn hydrate_appointment(&self, record: &AppointmentRecord) -> Appointment {
        Appointment {
            id: record.id,
            user_id: record.user_id,
            therapist_id: record.therapist_id,
            user_name: self.username(record.user_id),
            therapist_name: self.therapist_username(record.therapist_id),
            date: record.date,
            time: record.time.clone(),
            status: record.status,
            kind: record.kind,
            notes: record.notes.clone(),
            duration_minutes: record.duration_minutes,
            created_at: record.created_at,
            payment: self
                .payments
                .values()
                .find(|payment| payment.appointment_id == record.id)
                .cloned(),
        }
    }

    fn hydrate_review(&self, record: &ReviewRecord) -> Review {
        Review {
            id: record.id,
            user_id: record.user_id,
            therapist_id: record.therapist_id,
            user_name: self.username(record.user_id),
            rating: record.rating,
            comment: record.comment.clone(),
            date: record.date,
            created_at: record.created_at,
        }
    }

    fn hydrate_registration(&self, record: &RegistrationRecord) -> EventRegistration {
        EventRegistration {
            id: record.id,
            user_id: record.user_id,
            user_name: self.username(record.user_id),
            event_id: record.event_id,
            registered_at: record.registered_at,
            payment_status: record.payment_status,
        }
    }

    fn hydrate_event(&self, record: &EventRecord) -> Event {
        let mut registered_users: Vec<EventRegistration> = self
            .registrations
            .iter()
            .filter(|registration| registration.event_id == record.id)
            .map(|registration| self.hydrate_registration(registration))
            .collect();
        registered_users.sort_by_key(|registration| registration.registered_at);
        let spots_left = record.capacity - i32::try_from(registered_users.len()).unwrap_or(i32::MAX);
        Event {
            id: record.id,
            title: record.title.clone(),
            date: record.date,
            time: record.time.clone(),
            location: record.location.clone(),
            category: record.category,
            capacity: record.capacity,
            description: record.description.clone(),
            presenter: record.presenter.clone(),
            price_cents: record.price_cents,
            image: record.image.clone(),
            created_at: record.created_at,
            registered_users,
            spots_left,
        }
    }

    fn hydrate_reading_list(&self, record: &ReadingListRecord) -> ReadingList {
        let mut books: Vec<ReadingListItem> = self
            .reading_list_items
            .iter()
            .filter(|item| item.reading_list_id == record.id)
            .map(|item| ReadingListItem {
                id: item.id,
                title: item.title.clone(),
                position: item.position,
            })
            .collect();
        books.sort_by_key(|item| item.position);
        let book_count = i32::try_from(books.len()).unwrap_or(i32::MAX);
        ReadingList {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            category: record.category.clone(),
            image: record.image.clone(),
            created_at: record.created_at,
            books,
            book_count,
        }
    }

    fn hydrate_message(&self, record: &MessageRecord) -> Message {
        Message {
            id: record.id,
            sender_id: record.sender_id,
            receiver_id: record.receiver_id,
            sender_name: self.username(record.sender_id),
            receiver_name: self.username(record.receiver_id),
            body: record.body.clone(),
            sent_at: record.sent_at,
            read: record.read,
            created_at: record.created_at,
        }
    }

    fn replace_slots(&mut self, therapist_id: Uuid, slots: Vec<NewScheduleSlot>) {
        self.slots.retain(|slot| slot.therapist_id != therapist_id);
        let mut seen: Vec<(Weekday, SlotTime)> = Vec::new();
        for slot in slots {
            let key = (slot.day, slot.time.clone());
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            self.slots.push(SlotRecord {
                id: Uuid::new_v4(),
                therapist_id,
                day: slot.day,
                time: slot.time,
                available: slot.available,
            });
        }
    }

    fn remove_user_cascade(&mut self, user_id: Uuid) {
        let therapist_ids: Vec<Uuid> = self
            .therapists
            .values()
            .filter(|record| record.user_id == user_id)
            .map(|record| record.id)
            .collect();
        for therapist_id in therapist_ids {
            self.remove_therapist_cascade(therapist_id);
        }
        let appointment_ids: Vec<Uuid> = self
            .appointments
            .values()
            .filter(|record| record.user_id == user_id)
            .map(|record| record.id)
            .collect();
        for id in appointment_ids {
            self.remove_appointment_cascade(id);
        }
        self.reviews.retain(|_, record| record.user_id != user_id);
        self.registrations
            .retain(|record| record.user_id != user_id);
        self.messages
            .retain(|_, record| record.sender_id != user_id && record.receiver_id != user_id);
        self.notifications
            .retain(|_, record| record.user_id != Some(user_id));
        self.progress.retain(|_, record| record.user_id != user_id);
        self.users.remove(&user_id);
    }

    fn remove_therapist_cascade(&mut self, therapist_id: Uuid) {
        self.slots.retain(|slot| slot.therapist_id != therapist_id);
        let appointment_ids: Vec<Uuid> = self
            .appointments
            .values()
            .filter(|record| record.therapist_id == therapist_id)
            .map(|record| record.id)
            .collect();
        for id in appointment_ids {
            self.remove_appointment_cascade(id);
        }
        self.reviews
            .retain(|_, record| record.therapist_id != therapist_id);
        self.therapists.remove(&therapist_id);
    }

    fn remove_appointment_cascade(&mut self, appointment_id: Uuid) {
        self.payments
            .retain(|_, payment| payment.appointment_id != appointment_id);
        self.appointments.remove(&appointment_id);
    }

    fn appointment_visible(&self, viewer: &Viewer, record: &AppointmentRecord) -> bool {
        match viewer.role {
            UserRole::Admin => true,
            UserRole::Therapist => self
                .therapists
                .get(&record.therapist_id)
                .is_some_and(|therapist| therapist.user_id == viewer.user_id),
            UserRole::Client => record.user_id == viewer.user_id,
        }
    }
}

/// Shared in-memory store implementing every repository port.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let inner = self.read();
        let mut users: Vec<User> = inner
            .users
            .values()
            .map(|record| &record.user)
            .filter(|user| filter.role.is_none_or(|role| user.role == role))
            .filter(|user| {
                filter.search.as_deref().is_none_or(|needle| {
                    contains_ci(&user.username, needle) || contains_ci(&user.email, needle)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.date_joined.cmp(&a.date_joined));
        Ok(users)
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.read().users.get(&id).map(|record| record.user.clone()))
    }

    async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .read()
            .users
            .values()
            .find(|record| record.user.email == email)
            .map(|record| (record.user.clone(), record.password_hash.clone())))
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.write();
        if inner
            .users
            .values()
            .any(|record| record.user.email == user.email)
        {
            return Err(RepositoryError::duplicate("email"));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            phone: user.phone,
            role: user.role,
            profile_image: user.profile_image,
            date_joined: Utc::now(),
        };
        inner.users.insert(
            created.id,
            UserRecord {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, RepositoryError> {
        let mut inner = self.write();
        if let Some(email) = &patch.email {
            if inner
                .users
                .values()
                .any(|record| record.user.id != id && record.user.email == *email)
            {
                return Err(RepositoryError::duplicate("email"));
            }
        }
        let record = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("user"))?;
        if let Some(username) = patch.username {
            record.user.username = username;
        }
        if let Some(email) = patch.email {
            record.user.email = email;
        }
        if let Some(phone) = patch.phone {
            record.user.phone = phone;
        }
        if let Some(role) = patch.role {
            record.user.role = role;
        }
        if let Some(profile_image) = patch.profile_image {
            record.user.profile_image = profile_image;
        }
        if let Some(password_hash) = patch.password_hash {
            record.password_hash = password_hash;
        }
        Ok(record.user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.write();
        if !inner.users.contains_key(&id) {
            return Err(RepositoryError::missing("user"));
        }
        inner.remove_user_cascade(id);
        Ok(())
    }

    async fn count_by_role(&self, role: UserRole) -> Result<i64, RepositoryError> {
        let count = self
            .read()
            .users
            .values()
            .filter(|record| record.user.role == role)
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl TherapistRepository for MemoryStore {
    async fn list(&self, filter: &TherapistFilter) -> Result<Vec<Therapist>, RepositoryError> {
        let inner = self.read();
        let mut therapists: Vec<Therapist> = inner
            .therapists
            .values()
            .filter_map(|record| inner.hydrate_therapist(record))
            .filter(|therapist| !filter.available_only || therapist.available)
            .filter(|therapist| {
                filter
                    .specialty
                    .as_deref()
                    .is_none_or(|needle| contains_ci(&therapist.specialty, needle))
            })
            .filter(|therapist| {
                filter
                    .language
                    .as_deref()
                    .is_none_or(|language| therapist.languages.iter().any(|l| l == language))
            })
            .filter(|therapist| {
                filter
                    .min_price_cents
                    .is_none_or(|min| therapist.price_cents >= min)
                    && filter
                        .max_price_cents
                        .is_none_or(|max| therapist.price_cents <= max)
            })
            .filter(|therapist| filter.min_rating.is_none_or(|min| therapist.rating >= min))
            .filter(|therapist| {
                filter.search.as_deref().is_none_or(|needle| {
                    contains_ci(&therapist.user.username, needle)
                        || contains_ci(&therapist.specialty, needle)
                        || therapist
                            .specializations
                            .iter()
                            .any(|s| contains_ci(s, needle))
                })
            })
            .collect();
        therapists.sort_by(|a, b| a.user.username.cmp(&b.user.username));
        Ok(therapists)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Therapist>, RepositoryError> {
        let inner = self.read();
        Ok(inner
            .therapists
            .get(&id)
            .and_then(|record| inner.hydrate_therapist(record)))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Therapist>, RepositoryError> {
        let inner = self.read();
        Ok(inner
            .therapists
            .values()
            .find(|record| record.user_id == user_id)
            .and_then(|record| inner.hydrate_therapist(record)))
    }

    async fn create(&self, therapist: NewTherapist) -> Result<Therapist, RepositoryError> {
        let mut inner = self.write();
        if !inner.users.contains_key(&therapist.user_id) {
            return Err(RepositoryError::missing("user"));
        }
        if inner
            .therapists
            .values()
            .any(|record| record.user_id == therapist.user_id)
        {
            return Err(RepositoryError::duplicate("therapist profile"));
        }
        let id = Uuid::new_v4();
        inner.therapists.insert(
            id,
            TherapistRecord {
                id,
                user_id: therapist.user_id,
                specialty: therapist.specialty,
                experience_years: therapist.experience_years,
                available: therapist.available,
                price_cents: therapist.price_cents,
                languages: therapist.languages,
                specializations: therapist.specializations,
                education: therapist.education,
                about: therapist.about,
                rating: 0.0,
                reviews_count: 0,
            },
        );
        inner.replace_slots(id, therapist.schedule);
        let record = inner
            .therapists
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::query("therapist vanished during create"))?;
        inner
            .hydrate_therapist(&record)
            .ok_or_else(|| RepositoryError::query("therapist user vanished during create"))
    }

    async fn update(&self, id: Uuid, patch: TherapistPatch) -> Result<Therapist, RepositoryError> {
        let mut inner = self.write();
        {
            let record = inner
                .therapists
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::missing("therapist"))?;
            if let Some(specialty) = patch.specialty {
                record.specialty = specialty;
            }
            if let Some(experience_years) = patch.experience_years {
                record.experience_years = experience_years;
            }
            if let Some(available) = patch.available {
                record.available = available;
            }
            if let Some(price_cents) = patch.price_cents {
                record.price_cents = price_cents;
            }
            if let Some(languages) = patch.languages {
                record.languages = languages;
            }
            if let Some(specializations) = patch.specializations {
                record.specializations = specializations;
            }
            if let Some(education) = patch.education {
                record.education = education;
            }
            if let Some(about) = patch.about {
                record.about = about;
            }
        }
        if let Some(schedule) = patch.schedule {
            inner.replace_slots(id, schedule);
        }
        let record = inner
            .therapists
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::missing("therapist"))?;
        inner
            .hydrate_therapist(&record)
            .ok_or_else(|| RepositoryError::query("therapist user vanished during update"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.write();
        if !inner.therapists.contains_key(&id) {
            return Err(RepositoryError::missing("therapist"));
        }
        inner.remove_therapist_cascade(id);
        Ok(())
    }

    async fn replace_schedule(
        &self,
        id: Uuid,
        slots: Vec<NewScheduleSlot>,
    ) -> Result<Vec<ScheduleSlot>, RepositoryError> {
        let mut inner = self.write();
        if !inner.therapists.contains_key(&id) {
            return Err(RepositoryError::missing("therapist"));
        }
        inner.replace_slots(id, slots);
        let mut replaced: Vec<ScheduleSlot> = inner
            .slots
            .iter()
            .filter(|slot| slot.therapist_id == id)
            .map(|slot| ScheduleSlot {
                id: slot.id,
                day: slot.day,
                time: slot.time.clone(),
                available: slot.available,
            })
            .collect();
        replaced.sort_by(|a, b| (a.day, a.time.clone()).cmp(&(b.day, b.time.clone())));
        Ok(replaced)
    }

    async fn set_rating(&self, id: Uuid, rating: f64, count: i32) -> Result<(), RepositoryError> {
        let mut inner = self.write();
        let record = inner
            .therapists
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("therapist"))?;
        record.rating = rating;
        record.reviews_count = count;
        Ok(())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.read().therapists.len() as i64)
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn list(
        &self,
        viewer: &Viewer,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let inner = self.read();
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|record| inner.appointment_visible(viewer, record))
            .filter(|record| filter.status.is_none_or(|status| record.status == status))
            .filter(|record| filter.date.is_none_or(|date| record.date == date))
            .filter(|record| {
                filter
                    .therapist_id
                    .is_none_or(|id| record.therapist_id == id)
            })
            .filter(|record| filter.user_id.is_none_or(|id| record.user_id == id))
            .map(|record| inner.hydrate_appointment(record))
            .collect();
        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appointments)
    }

    async fn list_for_therapist(
        &self,
        therapist_id: Uuid,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let inner = self.read();
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|record| record.therapist_id == therapist_id)
            .map(|record| inner.hydrate_appointment(record))
            .collect();
        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appointments)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        let inner = self.read();
        Ok(inner
            .appointments
            .get(&id)
            .map(|record| inner.hydrate_appointment(record)))
    }

    async fn create(
        &self,
        appointment: NewAppointment,
        payment: Option<NewPayment>,
    ) -> Result<Appointment, RepositoryError> {
        let mut inner = self.write();
        if !inner.users.contains_key(&appointment.user_id) {
            return Err(RepositoryError::missing("user"));
        }
        if !inner.therapists.contains_key(&appointment.therapist_id) {
            return Err(RepositoryError::missing("therapist"));
        }
        let id = Uuid::new_v4();
        inner.appointments.insert(
            id,
            AppointmentRecord {
                id,
                user_id: appointment.user_id,
                therapist_id: appointment.therapist_id,
                date: appointment.date,
                time: appointment.time,
                status: appointment.status,
                kind: appointment.kind,
                notes: appointment.notes,
                duration_minutes: appointment.duration_minutes,
                created_at: Utc::now(),
            },
        );
        if let Some(payment) = payment {
            let payment_id = Uuid::new_v4();
            inner.payments.insert(
                payment_id,
                Payment {
                    id: payment_id,
                    appointment_id: id,
                    amount_cents: payment.amount_cents,
                    status: payment.status,
                    method: payment.method,
                    transaction_id: payment.transaction_id,
                    timestamp: Utc::now(),
                },
            );
        }
        let record = inner
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::query("appointment vanished during create"))?;
        Ok(inner.hydrate_appointment(&record))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, RepositoryError> {
        let mut inner = self.write();
        let record = inner
            .appointments
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("appointment"))?;
        if let Some(date) = patch.date {
            record.date = date;
        }
        if let Some(time) = patch.time {
            record.time = time;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(kind) = patch.kind {
            record.kind = kind;
        }
        if let Some(notes) = patch.notes {
            record.notes = notes;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            record.duration_minutes = duration_minutes;
        }
        let record = record.clone();
        Ok(inner.hydrate_appointment(&record))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError> {
        AppointmentRepository::update(
            self,
            id,
            AppointmentPatch {
                status: Some(status),
                ..AppointmentPatch::default()
            },
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.write();
        if !inner.appointments.contains_key(&id) {
            return Err(RepositoryError::missing("appointment"));
        }
        inner.remove_appointment_cascade(id);
        Ok(())
    }

    async fn shares_client(
        &self,
        therapist_user_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let inner = self.read();
        let therapist_ids: Vec<Uuid> = inner
            .therapists
            .values()
            .filter(|record| record.user_id == therapist_user_id)
            .map(|record| record.id)
            .collect();
        Ok(inner.appointments.values().any(|record| {
            record.user_id == user_id && therapist_ids.contains(&record.therapist_id)
        }))
    }

    async fn client_ids(&self, therapist_user_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let inner = self.read();
        let therapist_ids: Vec<Uuid> = inner
            .therapists
            .values()
            .filter(|record| record.user_id == therapist_user_id)
            .map(|record| record.id)
            .collect();
        let mut ids: Vec<Uuid> = inner
            .appointments
            .values()
            .filter(|record| therapist_ids.contains(&record.therapist_id))
            .map(|record| record.user_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn count_on(&self, date: NaiveDate) -> Result<i64, RepositoryError> {
        let count = self
            .read()
            .appointments
            .values()
            .filter(|record| record.date == date)
            .count();
        Ok(count as i64)
    }

    async fn count_by_status(&self) -> Result<Vec<(AppointmentStatus, i64)>, RepositoryError> {
        let inner = self.read();
        Ok(AppointmentStatus::ALL
            .into_iter()
            .map(|status| {
                let count = inner
                    .appointments
                    .values()
                    .filter(|record| record.status == status)
                    .count();
                (status, count as i64)
            })
            .filter(|(_, count)| *count > 0)
            .collect())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn list(&self, filter: &ReviewFilter) -> Result<Vec<Review>, RepositoryError> {
        let inner = self.read();
        let mut reviews: Vec<Review> = inner
            .reviews
            .values()
            .filter(|record| {
                filter
                    .therapist_id
                    .is_none_or(|id| record.therapist_id == id)
            })
            .filter(|record| filter.user_id.is_none_or(|id| record.user_id == id))
            .map(|record| inner.hydrate_review(record))
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Review>, RepositoryError> {
        let inner = self.read();
        Ok(inner
            .reviews
            .get(&id)
            .map(|record| inner.hydrate_review(record)))
    }

    async fn exists(&self, user_id: Uuid, therapist_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self
            .read()
            .reviews
            .values()
            .any(|record| record.user_id == user_id && record.therapist_id == therapist_id))
    }

    async fn create(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let mut inner = self.write();
        if inner
            .reviews
            .values()
            .any(|record| record.user_id == review.user_id && record.therapist_id == review.therapist_id)
        {
            return Err(RepositoryError::duplicate("review"));
        }
        let id = Uuid::new_v4();
        inner.reviews.insert(
            id,
            ReviewRecord {
                id,
                user_id: review.user_id,
                therapist_id: review.therapist_id,
                rating: review.rating,
                comment: review.comment,
                date: review.date,
                created_at: Utc::now(),
            },
        );
        let record = inner
            .reviews
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::query("review vanished during create"))?;
        Ok(inner.hydrate_review(&record))
    }

    async fn update(&self, id: Uuid, patch: ReviewPatch) -> Result<Review, RepositoryError> {
        let mut inner = self.write();
        let record = inner
            .reviews
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("review"))?;
        if let Some(rating) = patch.rating {
            record.rating = rating;
        }
        if let Some(comment) = patch.comment {
            record.comment = comment;
        }
        if let Some(date) = patch.date {
            record.date = date;
        }
        let record = record.clone();
        Ok(inner.hydrate_review(&record))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.write()
            .reviews
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::missing("review"))
    }

    async fn aggregate_for(&self, therapist_id: Uuid) -> Result<(f64, i32), RepositoryError> {
        let inner = self.read();
        let ratings: Vec<i16> = inner
            .reviews
            .values()
            .filter(|record| record.therapist_id == therapist_id)
            .map(|record| record.rating.value())
            .collect();
        if ratings.is_empty() {
            return Ok((0.0, 0));
        }
        let sum: i64 = ratings.iter().map(|rating| i64::from(*rating)).sum();
        let count = ratings.len();
        Ok((
            sum as f64 / count as f64,
            i32::try_from(count).unwrap_or(i32::MAX),
        ))
    }
}

#[async_trait]
impl ResourceRepository for MemoryStore {
    async fn list(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, RepositoryError> {
        let inner = self.read();
        let mut resources: Vec<Resource> = inner
            .resources
            .values()
            .filter(|resource| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|category| resource.category == category)
            })
            .filter(|resource| filter.kind.is_none_or(|kind| resource.kind == kind))
            .filter(|resource| !filter.featured_only || resource.featured)
            .filter(|resource| {
                filter
                    .tag
                    .as_deref()
                    .is_none_or(|tag| resource.tags.iter().any(|t| t == tag))
            })
            .filter(|resource| {
                filter.search.as_deref().is_none_or(|needle| {
                    contains_ci(&resource.title, needle)
                        || contains_ci(&resource.description, needle)
                        || contains_ci(&resource.author, needle)
                })
            })
            .cloned()
            .collect();
        resources.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(resources)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Resource>, RepositoryError> {
        Ok(self.read().resources.get(&id).cloned())
    }

    async fn create(&self, resource: NewResource) -> Result<Resource, RepositoryError> {
        let created = Resource {
            id: Uuid::new_v4(),
            title: resource.title,
            author: resource.author,
            description: resource.description,
            category: resource.category,
            tags: resource.tags,
            url: resource.url,
            featured: resource.featured,
            thumbnail_url: resource.thumbnail_url,
            duration: resource.duration,
            kind: resource.kind,
            rating: 0.0,
            reviews_count: 0,
            created_at: Utc::now(),
        };
        self.write().resources.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: ResourcePatch) -> Result<Resource, RepositoryError> {
        let mut inner = self.write();
        let resource = inner
            .resources
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("resource"))?;
        if let Some(title) = patch.title {
            resource.title = title;
        }
        if let Some(author) = patch.author {
            resource.author = author;
        }
        if let Some(description) = patch.description {
            resource.description = description;
        }
        if let Some(category) = patch.category {
            resource.category = category;
        }
        if let Some(tags) = patch.tags {
            resource.tags = tags;
        }
        if let Some(url) = patch.url {
            resource.url = url;
        }
        if let Some(featured) = patch.featured {
            resource.featured = featured;
        }
        if let Some(thumbnail_url) = patch.thumbnail_url {
            resource.thumbnail_url = thumbnail_url;
        }
        if let Some(duration) = patch.duration {
            resource.duration = duration;
        }
        if let Some(kind) = patch.kind {
            resource.kind = kind;
        }
        Ok(resource.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.write()
            .resources
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::missing("resource"))
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.read().resources.len() as i64)
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError> {
        let inner = self.read();
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|record| filter.category.is_none_or(|category| record.category == category))
            .filter(|record| filter.upcoming_from.is_none_or(|from| record.date >= from))
            .filter(|record| !filter.free_only || record.price_cents == 0)
            .filter(|record| {
                filter.search.as_deref().is_none_or(|needle| {
                    contains_ci(&record.title, needle)
                        || contains_ci(&record.description, needle)
                        || contains_ci(&record.presenter, needle)
                        || contains_ci(&record.location, needle)
                })
            })
            .map(|record| inner.hydrate_event(record))
            .collect();
        events.sort_by_key(|event| event.date);
        Ok(events)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Event>, RepositoryError> {
        let inner = self.read();
        Ok(inner
            .events
            .get(&id)
            .map(|record| inner.hydrate_event(record)))
    }

    async fn create(&self, event: NewEvent) -> Result<Event, RepositoryError> {
        let mut inner = self.write();
        let id = Uuid::new_v4();
        inner.events.insert(
            id,
            EventRecord {
                id,
                title: event.title,
                date: event.date,
                time: event.time,
                location: event.location,
                category: event.category,
                capacity: event.capacity,
                description: event.description,
                presenter: event.presenter,
                price_cents: event.price_cents,
                image: event.image,
                created_at: Utc::now(),
            },
        );
        let record = inner
            .events
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::query("event vanished during create"))?;
        Ok(inner.hydrate_event(&record))
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Event, RepositoryError> {
        let mut inner = self.write();
        let record = inner
            .events
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("event"))?;
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(date) = patch.date {
            record.date = date;
        }
        if let Some(time) = patch.time {
            record.time = time;
        }
        if let Some(location) = patch.location {
            record.location = location;
        }
        if let Some(category) = patch.category {
            record.category = category;
        }
        if let Some(capacity) = patch.capacity {
            record.capacity = capacity;
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(presenter) = patch.presenter {
            record.presenter = presenter;
        }
        if let Some(price_cents) = patch.price_cents {
            record.price_cents = price_cents;
        }
        if let Some(image) = patch.image {
            record.image = image;
        }
        let record = record.clone();
        Ok(inner.hydrate_event(&record))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.write();
        if inner.events.remove(&id).is_none() {
            return Err(RepositoryError::missing("event"));
        }
        inner.registrations.retain(|record| record.event_id != id);
        Ok(())
    }

    async fn registration_count(&self, event_id: Uuid) -> Result<i64, RepositoryError> {
        let count = self
            .read()
            .registrations
            .iter()
            .filter(|record| record.event_id == event_id)
            .count();
        Ok(count as i64)
    }

    async fn find_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>, RepositoryError> {
        let inner = self.read();
        Ok(inner
            .registrations
            .iter()
            .find(|record| record.event_id == event_id && record.user_id == user_id)
            .map(|record| inner.hydrate_registration(record)))
    }

    async fn add_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<EventRegistration, RepositoryError> {
        let mut inner = self.write();
        if !inner.events.contains_key(&event_id) {
            return Err(RepositoryError::missing("event"));
        }
        if inner
            .registrations
            .iter()
            .any(|record| record.event_id == event_id && record.user_id == user_id)
        {
            return Err(RepositoryError::duplicate("event registration"));
        }
        let record = RegistrationRecord {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            registered_at: Utc::now(),
            payment_status,
        };
        let hydrated = inner.hydrate_registration(&record);
        inner.registrations.push(record);
        Ok(hydrated)
    }

    async fn remove_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.write();
        let before = inner.registrations.len();
        inner
            .registrations
            .retain(|record| !(record.event_id == event_id && record.user_id == user_id));
        if inner.registrations.len() == before {
            return Err(RepositoryError::missing("event registration"));
        }
        Ok(())
    }

    async fn count_upcoming(&self, from: NaiveDate) -> Result<i64, RepositoryError> {
        let count = self
            .read()
            .events
            .values()
            .filter(|record| record.date >= from)
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl ReadingListRepository for MemoryStore {
    async fn list(&self, filter: &ReadingListFilter) -> Result<Vec<ReadingList>, RepositoryError> {
        let inner = self.read();
        let mut lists: Vec<ReadingList> = inner
            .reading_lists
            .values()
            .filter(|record| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|category| record.category == category)
            })
            .filter(|record| {
                filter.search.as_deref().is_none_or(|needle| {
                    contains_ci(&record.title, needle) || contains_ci(&record.description, needle)
                })
            })
            .map(|record| inner.hydrate_reading_list(record))
            .collect();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(lists)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ReadingList>, RepositoryError> {
        let inner = self.read();
        Ok(inner
            .reading_lists
            .get(&id)
            .map(|record| inner.hydrate_reading_list(record)))
    }

    async fn create(&self, list: NewReadingList) -> Result<ReadingList, RepositoryError> {
        let mut inner = self.write();
        let id = Uuid::new_v4();
        inner.reading_lists.insert(
            id,
            ReadingListRecord {
                id,
                title: list.title,
                description: list.description,
                category: list.category,
                image: list.image,
                created_at: Utc::now(),
            },
        );
        for (index, title) in list.books.into_iter().enumerate() {
            inner.reading_list_items.push(ItemRecord {
                id: Uuid::new_v4(),
                reading_list_id: id,
                title,
                position: i32::try_from(index).unwrap_or(i32::MAX),
            });
        }
        let record = inner
            .reading_lists
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::query("reading list vanished during create"))?;
        Ok(inner.hydrate_reading_list(&record))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ReadingListPatch,
    ) -> Result<ReadingList, RepositoryError> {
        let mut inner = self.write();
        {
            let record = inner
                .reading_lists
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::missing("reading list"))?;
            if let Some(title) = patch.title {
                record.title = title;
            }
            if let Some(description) = patch.description {
                record.description = description;
            }
            if let Some(category) = patch.category {
                record.category = category;
            }
            if let Some(image) = patch.image {
                record.image = image;
            }
        }
        if let Some(books) = patch.books {
            inner
                .reading_list_items
                .retain(|item| item.reading_list_id != id);
            for (index, title) in books.into_iter().enumerate() {
                inner.reading_list_items.push(ItemRecord {
                    id: Uuid::new_v4(),
                    reading_list_id: id,
                    title,
                    position: i32::try_from(index).unwrap_or(i32::MAX),
                });
            }
        }
        let record = inner
            .reading_lists
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::missing("reading list"))?;
        Ok(inner.hydrate_reading_list(&record))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut inner = self.write();
        if inner.reading_lists.remove(&id).is_none() {
            return Err(RepositoryError::missing("reading list"));
        }
        inner
            .reading_list_items
            .retain(|item| item.reading_list_id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<Category> = self.read().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        Ok(self.read().categories.get(&id).cloned())
    }

    async fn create(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        let created = Category {
            id: Uuid::new_v4(),
            title: category.title,
            icon: category.icon,
            color: category.color,
            count: category.count,
        };
        self.write().categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, RepositoryError> {
        let mut inner = self.write();
        let category = inner
            .categories
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("category"))?;
        if let Some(title) = patch.title {
            category.title = title;
        }
        if let Some(icon) = patch.icon {
            category.icon = icon;
        }
        if let Some(color) = patch.color {
            category.color = color;
        }
        if let Some(count) = patch.count {
            category.count = count;
        }
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.write()
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::missing("category"))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn list_visible(
        &self,
        viewer: &Viewer,
        read: Option<bool>,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let inner = self.read();
        let mut notifications: Vec<Notification> = inner
            .notifications
            .values()
            .filter(|notification| {
                notification.user_id == Some(viewer.user_id)
                    || (notification.user_id.is_none()
                        && notification.audience.includes(viewer.role))
            })
            .filter(|notification| read.is_none_or(|read| notification.read == read))
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(notifications)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Notification>, RepositoryError> {
        Ok(self.read().notifications.get(&id).cloned())
    }

    async fn create(&self, notification: NewNotification) -> Result<Notification, RepositoryError> {
        let created = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            audience: notification.audience,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            read: false,
            date: notification.date,
            created_at: Utc::now(),
        };
        self.write()
            .notifications
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.write()
            .notifications
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::missing("notification"))
    }

    async fn mark_read(&self, id: Uuid) -> Result<Notification, RepositoryError> {
        let mut inner = self.write();
        let notification = inner
            .notifications
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("notification"))?;
        notification.read = true;
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, viewer: &Viewer) -> Result<u64, RepositoryError> {
        let mut inner = self.write();
        let mut updated = 0_u64;
        for notification in inner.notifications.values_mut() {
            let visible = notification.user_id == Some(viewer.user_id)
                || (notification.user_id.is_none() && notification.audience.includes(viewer.role));
            if visible && !notification.read {
                notification.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn list_for(
        &self,
        user_id: Uuid,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, RepositoryError> {
        let inner = self.read();
        let mut messages: Vec<Message> = inner
            .messages
            .values()
            .filter(|record| record.sender_id == user_id || record.receiver_id == user_id)
            .filter(|record| {
                filter.partner_id.is_none_or(|partner| {
                    (record.sender_id == partner && record.receiver_id == user_id)
                        || (record.sender_id == user_id && record.receiver_id == partner)
                })
            })
            .filter(|record| filter.read.is_none_or(|read| record.read == read))
            .map(|record| inner.hydrate_message(record))
            .collect();
        messages.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(messages)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Message>, RepositoryError> {
        let inner = self.read();
        Ok(inner
            .messages
            .get(&id)
            .map(|record| inner.hydrate_message(record)))
    }

    async fn create(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let mut inner = self.write();
        if !inner.users.contains_key(&message.receiver_id) {
            return Err(RepositoryError::missing("receiver"));
        }
        let id = Uuid::new_v4();
        inner.messages.insert(
            id,
            MessageRecord {
                id,
                sender_id: message.sender_id,
                receiver_id: message.receiver_id,
                body: message.body,
                sent_at: message.sent_at,
                read: false,
                created_at: Utc::now(),
            },
        );
        let record = inner
            .messages
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::query("message vanished during create"))?;
        Ok(inner.hydrate_message(&record))
    }

    async fn mark_read(&self, id: Uuid) -> Result<Message, RepositoryError> {
        let mut inner = self.write();
        let record = inner
            .messages
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("message"))?;
        record.read = true;
        let record = record.clone();
        Ok(inner.hydrate_message(&record))
    }

    async fn conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, RepositoryError> {
        let inner = self.read();
        let mut partner_ids: Vec<Uuid> = inner
            .messages
            .values()
            .filter_map(|record| {
                if record.sender_id == user_id {
                    Some(record.receiver_id)
                } else if record.receiver_id == user_id {
                    Some(record.sender_id)
                } else {
                    None
                }
            })
            .collect();
        partner_ids.sort();
        partner_ids.dedup();

        let mut conversations = Vec::with_capacity(partner_ids.len());
        for partner_id in partner_ids {
            let Some(partner) = inner.users.get(&partner_id).map(|record| record.user.clone())
            else {
                continue;
            };
            let latest_message = inner
                .messages
                .values()
                .filter(|record| {
                    (record.sender_id == user_id && record.receiver_id == partner_id)
                        || (record.sender_id == partner_id && record.receiver_id == user_id)
                })
                .max_by_key(|record| record.sent_at)
                .map(|record| inner.hydrate_message(record));
            let unread_count = inner
                .messages
                .values()
                .filter(|record| {
                    record.sender_id == partner_id && record.receiver_id == user_id && !record.read
                })
                .count() as i64;
            conversations.push(Conversation {
                partner,
                latest_message,
                unread_count,
            });
        }
        conversations.sort_by(|a, b| {
            let a_key = a.latest_message.as_ref().map(|m| m.sent_at);
            let b_key = b.latest_message.as_ref().map(|m| m.sent_at);
            b_key.cmp(&a_key)
        });
        Ok(conversations)
    }
}

#[async_trait]
impl ProgressRepository for MemoryStore {
    async fn list(
        &self,
        viewer: &Viewer,
        filter: &ProgressFilter,
    ) -> Result<Vec<ProgressEntry>, RepositoryError> {
        let inner = self.read();
        let therapist_clients: Vec<Uuid> = if viewer.role == UserRole::Therapist {
            let therapist_ids: Vec<Uuid> = inner
                .therapists
                .values()
                .filter(|record| record.user_id == viewer.user_id)
                .map(|record| record.id)
                .collect();
            inner
                .appointments
                .values()
                .filter(|record| therapist_ids.contains(&record.therapist_id))
                .map(|record| record.user_id)
                .collect()
        } else {
            Vec::new()
        };
        let mut entries: Vec<ProgressEntry> = inner
            .progress
            .values()
            .filter(|entry| match viewer.role {
                UserRole::Admin => true,
                UserRole::Client => entry.user_id == viewer.user_id,
                UserRole::Therapist => therapist_clients.contains(&entry.user_id),
            })
            .filter(|entry| filter.user_id.is_none_or(|id| entry.user_id == id))
            .filter(|entry| filter.start_date.is_none_or(|start| entry.date >= start))
            .filter(|entry| filter.end_date.is_none_or(|end| entry.date <= end))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ProgressEntry>, RepositoryError> {
        Ok(self.read().progress.get(&id).cloned())
    }

    async fn create(&self, entry: NewProgressEntry) -> Result<ProgressEntry, RepositoryError> {
        let mut inner = self.write();
        if !inner.users.contains_key(&entry.user_id) {
            return Err(RepositoryError::missing("user"));
        }
        let created = ProgressEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            date: entry.date,
            mood_rating: entry.mood_rating,
            notes: entry.notes,
            completed_exercises: entry.completed_exercises,
            therapist_feedback: entry.therapist_feedback,
            created_at: Utc::now(),
        };
        inner.progress.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ProgressPatch,
    ) -> Result<ProgressEntry, RepositoryError> {
        let mut inner = self.write();
        let entry = inner
            .progress
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("progress entry"))?;
        if let Some(date) = patch.date {
            entry.date = date;
        }
        if let Some(mood_rating) = patch.mood_rating {
            entry.mood_rating = mood_rating;
        }
        if let Some(notes) = patch.notes {
            entry.notes = notes;
        }
        if let Some(completed_exercises) = patch.completed_exercises {
            entry.completed_exercises = completed_exercises;
        }
        if let Some(therapist_feedback) = patch.therapist_feedback {
            entry.therapist_feedback = therapist_feedback;
        }
        Ok(entry.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.write()
            .progress
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::missing("progress entry"))
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<AdminStats>, RepositoryError> {
        let mut stats: Vec<AdminStats> = self.read().stats.values().cloned().collect();
        stats.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(stats)
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<AdminStats>, RepositoryError> {
        Ok(self.read().stats.get(&date).cloned())
    }

    async fn insert(&self, stats: NewAdminStats) -> Result<AdminStats, RepositoryError> {
        let mut inner = self.write();
        if inner.stats.contains_key(&stats.date) {
            return Err(RepositoryError::duplicate("stats rollup"));
        }
        let created = AdminStats {
            id: Uuid::new_v4(),
            date: stats.date,
            total_therapists: stats.total_therapists,
            active_users: stats.active_users,
            appointments_today: stats.appointments_today,
            total_resources: stats.total_resources,
            user_growth: stats.user_growth,
            success_rate: stats.success_rate,
        };
        inner.stats.insert(created.date, created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(store: &MemoryStore, email: &str, role: UserRole) -> Uuid {
        UserRepository::create(
            store,
            NewUser {
                username: email.split('@').next().unwrap_or("user").into(),
                email: email.into(),
                phone: None,
                role,
                profile_image: None,
                password_hash: "$argon2id$stub".into(),
            },
        )
        .await
        .expect("seed user")
        .id
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_through_owned_records() {
        let store = MemoryStore::new();
        let therapist_user = seed_user(&store, "greg@example.com", UserRole::Therapist).await;
        let client = seed_user(&store, "ada@example.com", UserRole::Client).await;

        let therapist = TherapistRepository::create(
            &store,
            NewTherapist {
                user_id: therapist_user,
                specialty: "CBT".into(),
                experience_years: 5,
                available: true,
                price_cents: 8000,
                languages: vec![],
                specializations: vec![],
                education: vec![],
                about: String::new(),
                schedule: vec![NewScheduleSlot {
                    day: Weekday::Monday,
                    time: SlotTime::new("09:00").expect("valid time"),
                    available: true,
                }],
            },
        )
        .await
        .expect("seed therapist");

        AppointmentRepository::create(
            &store,
            NewAppointment {
                user_id: client,
                therapist_id: therapist.id,
                date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
                time: SlotTime::new("10:00").expect("valid time"),
                status: AppointmentStatus::Pending,
                kind: AppointmentKind::Video,
                notes: String::new(),
                duration_minutes: 60,
            },
            Some(NewPayment {
                amount_cents: 8000,
                status: PaymentStatus::Pending,
                method: crate::domain::appointment::PaymentMethod::Card,
                transaction_id: None,
            }),
        )
        .await
        .expect("seed appointment");

        UserRepository::delete(&store, therapist_user)
            .await
            .expect("delete user");

        assert!(
            TherapistRepository::find(&store, therapist.id)
                .await
                .expect("lookup")
                .is_none()
        );
        let viewer = Viewer {
            user_id: client,
            role: UserRole::Client,
        };
        let remaining = AppointmentRepository::list(&store, &viewer, &AppointmentFilter::default())
            .await
            .expect("list");
        assert!(remaining.is_empty());
        assert!(store.read().payments.is_empty());
        assert!(store.read().slots.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "ada@example.com", UserRole::Client).await;

        let err = UserRepository::create(
            &store,
            NewUser {
                username: "ada2".into(),
                email: "ada@example.com".into(),
                phone: None,
                role: UserRole::Client,
                profile_image: None,
                password_hash: "$argon2id$stub".into(),
            },
        )
        .await
        .expect_err("duplicate email");
        assert_eq!(err, RepositoryError::duplicate("email"));
    }
}
