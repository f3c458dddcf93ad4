//! Read access to cars and their maintenance records

use async_trait::async_trait;
use carcare_domain::{Car, CarCareError, MaintenanceRecord, Result};

#[async_trait]
pub trait MaintenanceRecordSource: Send + Sync {
    async fn car(&self, car_id: &str) -> Result<Car>;

    async fn maintenance_records(&self, car_id: &str) -> Result<Vec<MaintenanceRecord>>;

    /// One record of a car, or `NotFound`.
    async fn maintenance_record(&self, car_id: &str, record_id: &str) -> Result<MaintenanceRecord> {
        self.maintenance_records(car_id)
            .await?
            .into_iter()
            .find(|record| record.id == record_id)
            .ok_or_else(|| {
                CarCareError::NotFound(format!("maintenance record {record_id} of car {car_id}"))
            })
    }
}
