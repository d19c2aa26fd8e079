use hickory_proto::op::Message;
use splitroute_domain::IpNetworkSet;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::services::message::answer_ips;
use crate::services::{ClientBundle, Group};

/// Chooses between the groups when no routing rule applies, by classifying
/// the primary answer's addresses against the two IP network sets.
pub struct RaceArbiter {
    primary_set: IpNetworkSet,
    alternative_set: IpNetworkSet,
    answer_none_use_alternative: bool,
    alternative_concurrent: bool,
}

enum AlternativeLaunch {
    Pending(ClientBundle),
    Running(oneshot::Receiver<ClientBundle>),
}

impl AlternativeLaunch {
    async fn wait(self) -> Option<ClientBundle> {
        let result = match self {
            AlternativeLaunch::Pending(bundle) => launch(bundle),
            AlternativeLaunch::Running(result) => result,
        };
        match result.await {
            Ok(bundle) => Some(bundle),
            Err(_) => {
                warn!("Alternative exchange task ended without a result");
                None
            }
        }
    }
}

/// Runs the bundle's exchange on its own task. The bundle comes back over
/// the channel; if nobody is listening any more it is dropped there.
fn launch(mut bundle: ClientBundle) -> oneshot::Receiver<ClientBundle> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        bundle.exchange(false, true).await;
        let _ = tx.send(bundle);
    });
    rx
}

impl RaceArbiter {
    pub fn new(
        primary_set: IpNetworkSet,
        alternative_set: IpNetworkSet,
        answer_none_use_alternative: bool,
        alternative_concurrent: bool,
    ) -> Self {
        Self {
            primary_set,
            alternative_set,
            answer_none_use_alternative,
            alternative_concurrent,
        }
    }

    /// Returns the selected bundle with its response filled in. Nothing is
    /// cached here.
    pub async fn select(
        &self,
        primary: ClientBundle,
        alternative: ClientBundle,
    ) -> Option<ClientBundle> {
        let primary_result = launch(primary);
        let alternative = if self.alternative_concurrent {
            AlternativeLaunch::Running(launch(alternative))
        } else {
            AlternativeLaunch::Pending(alternative)
        };

        let primary = match primary_result.await {
            Ok(bundle) => bundle,
            Err(_) => {
                warn!("Primary exchange task ended without a result");
                return alternative.wait().await;
            }
        };

        match self.classify(primary.response_message()) {
            Group::Primary => Some(primary),
            Group::Alternative => alternative.wait().await,
        }
    }

    /// First A/AAAA record matching either set decides; the primary set is
    /// checked first for each record.
    pub fn classify(&self, primary_response: Option<&Message>) -> Group {
        let Some(response) = primary_response else {
            debug!("Primary DNS returned nothing, finally use Alternative DNS");
            return Group::Alternative;
        };

        if response.answers().is_empty() {
            if self.answer_none_use_alternative {
                debug!("Primary DNS response has no answer section, finally use Alternative DNS");
                return Group::Alternative;
            }
            debug!("Primary DNS response has no answer section, finally use Primary DNS");
            return Group::Primary;
        }

        for ip in answer_ips(response) {
            if self.primary_set.contains(ip, true, "primary") {
                debug!(ip = %ip, "Finally use Primary DNS");
                return Group::Primary;
            }
            if self.alternative_set.contains(ip, true, "alternative") {
                debug!(ip = %ip, "Finally use Alternative DNS");
                return Group::Alternative;
            }
        }

        debug!("IP network match failed, finally use Alternative DNS");
        Group::Alternative
    }
}
