use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    AlreadyOwned,
    NotEnoughLogs,
}

pub fn owned(run: &RunState, item: ShopItem) -> bool {
    match item {
        ShopItem::SharpAxe => run.axe_upgrade,
        ShopItem::FurLining => run.fur_lining,
        ShopItem::DeepPockets => run.deep_pockets,
    }
}

/// Pays for `item` out of the haven stash.
pub fn purchase(run: &mut RunState, item: ShopItem) -> PurchaseOutcome {
    if owned(run, item) {
        return PurchaseOutcome::AlreadyOwned;
    }
    if run.log_stash < item.cost() {
        return PurchaseOutcome::NotEnoughLogs;
    }
    run.log_stash -= item.cost();
    match item {
        ShopItem::SharpAxe => run.axe_upgrade = true,
        ShopItem::FurLining => run.fur_lining = true,
        ShopItem::DeepPockets => run.deep_pockets = true,
    }
    PurchaseOutcome::Purchased
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_spends_stash_once() {
        let mut run = RunState {
            log_stash: 70,
            ..Default::default()
        };
        assert_eq!(purchase(&mut run, ShopItem::SharpAxe), PurchaseOutcome::Purchased);
        assert!(run.axe_upgrade);
        assert_eq!(run.log_stash, 20);
        assert_eq!(purchase(&mut run, ShopItem::SharpAxe), PurchaseOutcome::AlreadyOwned);
        assert_eq!(purchase(&mut run, ShopItem::FurLining), PurchaseOutcome::NotEnoughLogs);
        assert_eq!(run.log_stash, 20);
        assert!(!run.fur_lining);
    }

    #[test]
    fn deep_pockets_raise_capacity() {
        let mut run = RunState {
            log_stash: ShopItem::DeepPockets.cost(),
            ..Default::default()
        };
        assert_eq!(purchase(&mut run, ShopItem::DeepPockets), PurchaseOutcome::Purchased);
        assert_eq!(run.log_capacity(), MAX_LOG_SLOTS + DEEP_POCKETS_BONUS);
    }
}
