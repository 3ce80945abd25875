use bevy::prelude::*;

use crate::ai::diplomacy::{DiplomaticTrade, TradeStatus};
use crate::game::NationId;

/// An agreement offered to an AI faction. The recipient answers it.
#[derive(Message, Debug, Clone)]
pub struct TradeProposal {
    pub trade: DiplomaticTrade,
}

/// An AI faction's answer. For a counter-proposal `trade` holds the amended
/// agreement with its round bumped.
#[derive(Message, Debug, Clone)]
pub struct TradeResponse {
    pub responder: NationId,
    pub status: TradeStatus,
    pub trade: DiplomaticTrade,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::diplomacy::TradeContext;

    #[test]
    fn responses_carry_the_amended_trade() {
        let trade = DiplomaticTrade::new(TradeContext::Trade, NationId(1), NationId(2));
        let response = TradeResponse {
            responder: NationId(2),
            status: TradeStatus::Reject,
            trade: trade.clone(),
        };
        assert_eq!(response.trade, trade);
        assert_eq!(response.trade.other(response.responder), NationId(1));
    }
}
