use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use chrono::Utc;
use metrics::counter;
use tokio::sync::{mpsc, Mutex};

use crate::errors::AnalysisError;
use crate::intelligence::SwapDetector;
use crate::models::{short_address, ActivityCategory, AddressActivity, MirrorSignal};
use crate::providers::{with_timeout, ChainDataProvider};
use crate::WhaleScores;

/// Transaction hashes remembered for deduplication.
const PROCESSED_CAPACITY: usize = 10_000;

/// Insertion-ordered hash set holding at most `capacity` entries; the oldest
/// hash is forgotten first.
#[derive(Debug)]
struct RecentHashes {
    seen: HashSet<B256>,
    order: VecDeque<B256>,
    capacity: usize,
}

impl RecentHashes {
    fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// `false` if `hash` is already remembered.
    fn insert(&mut self, hash: B256) -> bool {
        if !self.seen.insert(hash) {
            return false;
        }

        self.order.push_back(hash);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    fn remove(&mut self, hash: &B256) {
        if self.seen.remove(hash) {
            self.order.retain(|h| h != hash);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Turns address-activity notifications into mirror signals for swaps made
/// by ranked whales.
pub struct ActivityPipeline {
    chain: Arc<dyn ChainDataProvider>,
    detector: SwapDetector,
    whale_scores: WhaleScores,
    min_score: u32,
    provider_timeout: Duration,
    processed: Mutex<RecentHashes>,
    signal_tx: Option<mpsc::Sender<MirrorSignal>>,
}

impl ActivityPipeline {
    pub fn new(
        chain: Arc<dyn ChainDataProvider>,
        detector: SwapDetector,
        whale_scores: WhaleScores,
        min_score: u32,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            detector,
            whale_scores,
            min_score,
            provider_timeout,
            processed: Mutex::new(RecentHashes::new(PROCESSED_CAPACITY)),
            signal_tx: None,
        }
    }

    /// Remember at most `capacity` processed hashes.
    pub fn with_dedupe_capacity(mut self, capacity: usize) -> Self {
        self.processed = Mutex::new(RecentHashes::new(capacity));
        self
    }

    /// Forward emitted signals to `tx`.
    pub fn with_signal_channel(mut self, tx: mpsc::Sender<MirrorSignal>) -> Self {
        self.signal_tx = Some(tx);
        self
    }

    /// Process a single activity notification:
    /// 1. Skip anything but token activity
    /// 2. Skip transaction hashes already processed
    /// 3. Fetch the receipt (provider errors propagate)
    /// 4. Detect a swap, using the activity's address pair as fallback
    /// 5. Emit a MirrorSignal if a party is a whale at or above the minimum score
    pub async fn process_activity(
        &self,
        activity: &AddressActivity,
    ) -> Result<Option<MirrorSignal>, AnalysisError> {
        // Step 1: Category filter
        if activity.category != ActivityCategory::Token {
            tracing::debug!(tx = %activity.hash, category = ?activity.category, "Not token activity, skipping");
            return Ok(None);
        }

        // Step 2: Dedupe
        if !self.processed.lock().await.insert(activity.hash) {
            tracing::debug!(tx = %activity.hash, "Activity already processed, skipping");
            return Ok(None);
        }

        // Step 3: Receipt
        let receipt = match with_timeout(
            self.provider_timeout,
            self.chain.transaction_receipt(activity.hash),
        )
        .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                // Allow a redelivery to retry
                self.processed.lock().await.remove(&activity.hash);
                return Err(e.into());
            }
        };

        // Step 4: Swap detection
        let pair = (activity.from_address, activity.to_address);
        let Some(swap) = self.detector.detect(&receipt, Some(pair)) else {
            return Ok(None);
        };

        counter!("swaps_detected_total").increment(1);
        tracing::info!(
            tx = %activity.hash,
            protocol = %swap.protocol,
            initiator = %short_address(&swap.initiator),
            input = %swap.input_token,
            output = %swap.output_token,
            "Swap detected"
        );

        // Step 5: Whale gate
        let candidates = [swap.initiator, activity.from_address, activity.to_address];
        let Some((wallet, whale_score)) = self.tracked_whale(&candidates).await else {
            tracing::debug!(tx = %activity.hash, "Swap not made by a tracked whale");
            return Ok(None);
        };

        if whale_score < self.min_score {
            tracing::debug!(
                wallet = %wallet,
                score = whale_score,
                min = self.min_score,
                "Whale below mirror threshold"
            );
            return Ok(None);
        }

        let signal = MirrorSignal {
            wallet,
            protocol: swap.protocol,
            input_token: swap.input_token,
            output_token: swap.output_token,
            transaction_hash: activity.hash,
            whale_score,
            detected_at: Utc::now(),
        };

        if let Some(tx) = &self.signal_tx {
            if let Err(e) = tx.send(signal.clone()).await {
                tracing::error!(error = %e, "Failed to send MirrorSignal");
            } else {
                counter!("mirror_signals_emitted").increment(1);
                tracing::info!(
                    wallet = %signal.wallet,
                    protocol = %signal.protocol,
                    score = whale_score,
                    "MirrorSignal emitted"
                );
            }
        }

        Ok(Some(signal))
    }

    /// Run a batch of notifications through the pipeline, logging failures.
    /// Returns the number of signals produced.
    pub async fn replay(&self, activities: &[AddressActivity]) -> usize {
        let mut emitted = 0;
        for activity in activities {
            match self.process_activity(activity).await {
                Ok(Some(_)) => emitted += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(tx = %activity.hash, error = %e, "Activity processing failed");
                }
            }
        }
        emitted
    }

    async fn tracked_whale(&self, candidates: &[Address]) -> Option<(Address, u32)> {
        let scores = self.whale_scores.read().await;
        candidates
            .iter()
            .find_map(|addr| scores.get(addr).map(|score| (*addr, *score)))
    }
}
