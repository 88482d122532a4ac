// Expense log and spending statistics.

use crate::client::{ApiClient, ApiRequest};
use crate::entity_id::EntityId;
use crate::error::Error;
use crate::models::{ApiResponse, Expense, ExpenseInput, Statistics, StatisticsPeriod};
use crate::routes;

impl ApiClient {
    /// One page of expenses. The envelope carries `pagination`.
    pub async fn list_expenses(
        &self,
        page: u32,
        vehicle_id: Option<&EntityId>,
    ) -> Result<ApiResponse<Vec<Expense>>, Error> {
        let mut request = ApiRequest::get(routes::EXPENSES.path()).query("page", page);
        if let Some(id) = vehicle_id {
            request = request.query("vehicle_id", id);
        }
        self.execute(request).await
    }

    pub async fn create_expense(&self, input: &ExpenseInput) -> Result<ApiResponse<Expense>, Error> {
        self.post(routes::EXPENSES.path(), input).await
    }

    pub async fn get_statistics(
        &self,
        vehicle_id: Option<&EntityId>,
        period: StatisticsPeriod,
    ) -> Result<ApiResponse<Statistics>, Error> {
        let mut request = ApiRequest::get(routes::STATISTICS.path()).query("period", period);
        if let Some(id) = vehicle_id {
            request = request.query("vehicle_id", id);
        }
        self.execute(request).await
    }
}
