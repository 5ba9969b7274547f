use std::sync::Arc;

use noticeboard_api_types::{CoffeeConsumptionResponse, TopCoffeeBrandItem, WeeklyMoodItem};

use crate::application::error::AppError;
use crate::application::repos::ChartsApi;

/// Read-only access to the chart data series.
pub struct ChartService {
    charts: Arc<dyn ChartsApi>,
}

impl ChartService {
    pub fn new(charts: Arc<dyn ChartsApi>) -> Self {
        Self { charts }
    }

    /// Brands sorted by popularity, most popular first.
    pub async fn top_brands(&self) -> Result<Vec<TopCoffeeBrandItem>, AppError> {
        let mut brands = self.charts.top_coffee_brands().await?;
        brands.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
        Ok(brands)
    }

    pub async fn mood_trend(&self) -> Result<Vec<WeeklyMoodItem>, AppError> {
        Ok(self.charts.weekly_mood_trend().await?)
    }

    pub async fn coffee_consumption(&self) -> Result<CoffeeConsumptionResponse, AppError> {
        Ok(self.charts.coffee_consumption().await?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::repos::ApiError;

    struct FixedCharts;

    #[async_trait]
    impl ChartsApi for FixedCharts {
        async fn top_coffee_brands(&self) -> Result<Vec<TopCoffeeBrandItem>, ApiError> {
            Ok(vec![
                TopCoffeeBrandItem {
                    brand: "B".into(),
                    popularity: 10.0,
                },
                TopCoffeeBrandItem {
                    brand: "A".into(),
                    popularity: 42.5,
                },
            ])
        }

        async fn weekly_mood_trend(&self) -> Result<Vec<WeeklyMoodItem>, ApiError> {
            Ok(Vec::new())
        }

        async fn coffee_consumption(&self) -> Result<CoffeeConsumptionResponse, ApiError> {
            Err(ApiError::Network("offline".into()))
        }
    }

    #[tokio::test]
    async fn top_brands_are_sorted_by_popularity() {
        let service = ChartService::new(std::sync::Arc::new(FixedCharts));
        let brands = service.top_brands().await.expect("brands");
        assert_eq!(brands[0].brand, "A");
        assert!(service.coffee_consumption().await.is_err());
    }
}
