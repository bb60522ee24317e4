//! Payload fixtures shaped like the Meta Ads insights rows the automation
//! forwards.

use serde_json::{json, Value};

/// Builder for a single campaign insights object.
#[derive(Debug, Clone)]
pub struct CampaignBuilder {
    campaign_name: String,
    account_name: String,
    spend: f64,
    impressions: u64,
    clicks: u64,
    date_start: String,
    date_stop: String,
}

impl CampaignBuilder {
    /// Creates a campaign with plausible defaults.
    pub fn new(campaign_name: impl Into<String>) -> Self {
        Self {
            campaign_name: campaign_name.into(),
            account_name: "CA - Snob Motel".to_string(),
            spend: 100.0,
            impressions: 10_000,
            clicks: 250,
            date_start: "2024-03-01".to_string(),
            date_stop: "2024-03-01".to_string(),
        }
    }

    /// Sets the ad account name.
    #[must_use]
    pub fn account_name(mut self, name: impl Into<String>) -> Self {
        self.account_name = name.into();
        self
    }

    /// Sets the amount spent.
    #[must_use]
    pub fn spend(mut self, spend: f64) -> Self {
        self.spend = spend;
        self
    }

    /// Sets impressions and clicks.
    #[must_use]
    pub fn reach(mut self, impressions: u64, clicks: u64) -> Self {
        self.impressions = impressions;
        self.clicks = clicks;
        self
    }

    /// Sets the reporting window.
    #[must_use]
    pub fn dates(mut self, start: impl Into<String>, stop: impl Into<String>) -> Self {
        self.date_start = start.into();
        self.date_stop = stop.into();
        self
    }

    /// Builds the JSON object.
    pub fn build(self) -> Value {
        #[allow(clippy::cast_precision_loss)]
        let ctr = if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64 * 100.0
        };

        json!({
            "campaign_name": self.campaign_name,
            "account_name": self.account_name,
            "spend": self.spend,
            "impressions": self.impressions,
            "clicks": self.clicks,
            "ctr": ctr,
            "objective": "OUTCOME_LEADS",
            "date_start": self.date_start,
            "date_stop": self.date_stop,
        })
    }
}

/// A daily payload with one campaign.
pub fn daily_campaign(campaign_name: &str, spend: f64) -> Value {
    CampaignBuilder::new(campaign_name).spend(spend).build()
}

/// A weekly payload: one row per campaign across a week.
pub fn weekly_campaigns(campaign_names: &[&str]) -> Value {
    Value::Array(
        campaign_names
            .iter()
            .map(|name| CampaignBuilder::new(*name).dates("2024-03-01", "2024-03-07").build())
            .collect(),
    )
}
