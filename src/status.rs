use crate::models::{ContractTable, StatusGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTier {
    Alert,
    Healthy,
    Neutral,
}

impl StatusTier {
    pub fn classify(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "expired" => StatusTier::Alert,
            "active" => StatusTier::Healthy,
            _ => StatusTier::Neutral,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            StatusTier::Alert => "#f44336",
            StatusTier::Healthy => "#4CAF50",
            StatusTier::Neutral => "#2196F3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusTier::Alert => "alert",
            StatusTier::Healthy => "healthy",
            StatusTier::Neutral => "info",
        }
    }
}

/// Groups records by their exact status text, in the order each status is
/// first seen. Records without a status belong to no group.
pub fn partition_by_status(table: &ContractTable) -> Vec<StatusGroup> {
    let mut groups: Vec<StatusGroup> = Vec::new();

    for record in &table.records {
        let Some(status) = record.subscription_status.as_deref() else {
            continue;
        };

        match groups.iter_mut().find(|group| group.status == status) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(StatusGroup {
                status: status.to_string(),
                records: vec![record.clone()],
            }),
        }
    }

    tracing::debug!(groups = groups.len(), "partitioned contracts by status");
    groups
}
