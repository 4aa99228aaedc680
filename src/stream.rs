use std::time::Duration;

use alloy::{
    providers::Provider,
    rpc::types::{Filter, Log},
    sol_types::SolEventInterface,
};
use futures::{Stream, stream};

use crate::{Chain, abi::market::Marketplace::MarketplaceEvents, error::MarketError, types};

pub type RawEvent = types::EventContext<MarketplaceEvents>;
pub type RawBlockEvents = types::BlockEvents<RawEvent>;

/// Returns stream of raw events emitted by the marketplace smart
/// contract, batched per block, starting from the specified block.
///
/// Polls logs via the given [`Provider`] to produce strictly continuous
/// event sequence, with [`Provider`]-configured interval. Consumers use
/// listing events as the signal to refetch a
/// [`crate::book::ListingBook`] instead of reloading state wholesale.
pub fn raw<P, S, SFut>(
    chain: &Chain,
    provider: P,
    from: types::StateInstant,
    sleep: S,
) -> impl Stream<Item = Result<RawBlockEvents, MarketError>>
where
    P: Provider,
    S: Fn(Duration) -> SFut + Copy,
    SFut: Future<Output = ()>,
{
    stream::unfold(
        (provider, from.block_number()),
        move |(provider, mut block_num)| async move {
            let filter = Filter::new()
                .address(chain.marketplace())
                .from_block(block_num)
                .to_block(block_num);
            loop {
                // Some RPC providers produce an empty response instead of an
                // error when the block in the filter does not exist yet, so
                // the head of the chain is checked alongside the logs
                let result =
                    futures::try_join!(provider.get_block_number(), provider.get_logs(&filter))
                        .map_err(MarketError::from)
                        .and_then(|(head_block_num, logs)| {
                            if head_block_num < block_num {
                                return Err(MarketError::InvalidRequest(
                                    "block is not available yet".to_string(),
                                ));
                            }
                            decode_block(block_num, &logs)
                        });
                if result.is_ok() {
                    block_num += 1;
                    return Some((result, (provider, block_num)));
                }
                if matches!(result, Err(MarketError::InvalidRequest(_))) {
                    // Block is not available yet
                    sleep(provider.client().poll_interval()).await;
                    continue;
                }
                return Some((result, (provider, block_num)));
            }
        },
    )
}

/// Decodes one block's worth of marketplace logs, preserving log order.
fn decode_block(block_num: u64, logs: &[Log]) -> Result<RawBlockEvents, MarketError> {
    let mut events = Vec::with_capacity(logs.len());
    let block_ts = logs.first().and_then(|l| l.block_timestamp);
    for log in logs {
        events.push(RawEvent::new(
            log.transaction_hash.unwrap_or_default(),
            log.log_index.unwrap_or_default(),
            MarketplaceEvents::decode_log(&log.inner)
                .map_err(MarketError::from)?
                .data,
        ));
    }
    Ok(RawBlockEvents::new(
        types::StateInstant::new(block_num, block_ts.unwrap_or_default()),
        events,
    ))
}
