use crate::{
    error::{AppError, AppResult},
    models::technician::{
        CreateTechnician, Technician, TechnicianQuery, TechnicianWorkload, UpdateTechnician,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TechniciansService {
    repository: Repository,
}

impl TechniciansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &TechnicianQuery) -> AppResult<Vec<Technician>> {
        self.repository.technicians.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Technician> {
        self.repository.technicians.get_by_id(id).await
    }

    pub async fn create(&self, data: CreateTechnician) -> AppResult<Technician> {
        if self
            .repository
            .technicians
            .get_by_employee_code(&data.employee_code)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Employee code {} already exists",
                data.employee_code
            )));
        }
        if let Some(user_id) = data.user_id {
            self.repository.users.get_by_id(user_id).await?;
        }
        let technician = self.repository.technicians.create(&data).await?;
        tracing::info!(technician_id = technician.id, "Technician created");
        Ok(technician)
    }

    pub async fn update(&self, id: i32, data: UpdateTechnician) -> AppResult<Technician> {
        self.repository.technicians.get_by_id(id).await?;
        if let Some(ref code) = data.employee_code {
            if let Some(other) = self.repository.technicians.get_by_employee_code(code).await? {
                if other.id != id {
                    return Err(AppError::Conflict(format!("Employee code {} already exists", code)));
                }
            }
        }
        if let Some(user_id) = data.user_id {
            self.repository.users.get_by_id(user_id).await?;
        }
        self.repository.technicians.update(id, &data).await
    }

    /// Technicians keep their ticket history, so delete only deactivates
    pub async fn delete(&self, id: i32) -> AppResult<Technician> {
        let technician = self.repository.technicians.deactivate(id).await?;
        tracing::info!(technician_id = id, "Technician deactivated");
        Ok(technician)
    }

    pub async fn workload(&self, id: i32) -> AppResult<TechnicianWorkload> {
        let technician = self.repository.technicians.get_by_id(id).await?;
        self.repository.technicians.workload(&technician).await
    }

    /// E-mail address used for assignment notices: the technician's own, else the linked account's
    pub async fn contact_email(&self, technician: &Technician) -> AppResult<Option<String>> {
        if technician.email.is_some() {
            return Ok(technician.email.clone());
        }
        match technician.user_id {
            Some(user_id) => self.repository.users.email_of(user_id).await,
            None => Ok(None),
        }
    }
}
