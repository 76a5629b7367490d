//! Thin typed wrappers, one per backend endpoint.

use super::ApiClient;
use crate::error::ClientError;
use crate::models::{
    Contribution, DashboardStats, LoginRequest, LoginResponse, MassTime, MessageResponse,
    NewContribution, NewRegistration, ParishInfo, Pastoral, RegisterRequest, Registration,
    RegistrationStatus, Service, StatusUpdate, UserProfile, UserUpdate,
};

impl ApiClient {
    // Public

    pub async fn parish_info(&self) -> Result<ParishInfo, ClientError> {
        self.get("/api/parish-info").await
    }

    pub async fn services(&self) -> Result<Vec<Service>, ClientError> {
        self.get("/api/services").await
    }

    pub async fn pastorals(&self) -> Result<Vec<Pastoral>, ClientError> {
        self.get("/api/pastorais").await
    }

    pub async fn mass_times(&self) -> Result<Vec<MassTime>, ClientError> {
        self.get("/api/mass-times").await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, ClientError> {
        self.post("/api/register", request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.post("/api/login", request).await
    }

    // Authenticated

    pub async fn create_registration(&self, service_id: u64) -> Result<MessageResponse, ClientError> {
        self.post("/api/registrations", &NewRegistration { service_id })
            .await
    }

    pub async fn my_registrations(&self) -> Result<Vec<Registration>, ClientError> {
        self.get("/api/my-registrations").await
    }

    pub async fn create_contribution(
        &self,
        contribution: &NewContribution,
    ) -> Result<MessageResponse, ClientError> {
        self.post("/api/contributions", contribution).await
    }

    pub async fn my_contributions(&self) -> Result<Vec<Contribution>, ClientError> {
        self.get("/api/my-contributions").await
    }

    // Admin

    pub async fn admin_registrations(&self) -> Result<Vec<Registration>, ClientError> {
        self.get("/api/admin/registrations").await
    }

    pub async fn update_registration_status(
        &self,
        id: u64,
        status: RegistrationStatus,
    ) -> Result<MessageResponse, ClientError> {
        self.patch(
            &format!("/api/admin/registrations/{}", id),
            &StatusUpdate { status },
        )
        .await
    }

    pub async fn admin_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.get("/api/admin/users").await
    }

    pub async fn update_user(&self, id: u64, update: &UserUpdate) -> Result<MessageResponse, ClientError> {
        self.put(&format!("/api/admin/users/{}", id), update).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        self.get("/api/admin/dashboard-stats").await
    }
}
