use std::time::Duration;

use crate::source::ProviderId;

/// Static rate policy for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub quota_window: Duration,
    pub quota_limit: u32,
}

impl ProviderPolicy {
    /// Conservative default for the EODHD API: requests are spread so a
    /// burst cannot exhaust the daily allowance in one batch run.
    pub fn eodhd_default() -> Self {
        Self {
            provider_id: ProviderId::Eodhd,
            quota_window: Duration::from_secs(60),
            quota_limit: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eodhd_policy_allows_one_request_per_second() {
        let policy = ProviderPolicy::eodhd_default();

        assert_eq!(policy.provider_id, ProviderId::Eodhd);
        assert_eq!(policy.quota_window, Duration::from_secs(60));
        assert_eq!(policy.quota_limit, 60);
    }
}
