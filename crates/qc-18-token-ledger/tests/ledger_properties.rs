//! Property tests over random operation sequences.

use proptest::prelude::*;
use qc_18_token_ledger::prelude::*;

const OWNER: Address = Address::new([0x01; 20]);

fn party(index: u8) -> Address {
    if index == 0 {
        OWNER
    } else {
        Address::new([index.wrapping_add(1); 20])
    }
}

#[derive(Debug, Clone)]
enum Op {
    Transfer { from: u8, to: u8, amount: Amount },
    Stake { who: u8, amount: Amount },
    Withdraw { who: u8, amount: Amount },
    Settle { who: u8 },
    Airdrop { to: u8, amount: Amount },
    Block { who: u8, blocked: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let who = 0u8..4;
    let amount = 0u128..tokens(200);
    prop_oneof![
        (who.clone(), who.clone(), amount.clone())
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        (who.clone(), amount.clone()).prop_map(|(who, amount)| Op::Stake { who, amount }),
        (who.clone(), amount.clone()).prop_map(|(who, amount)| Op::Withdraw { who, amount }),
        who.clone().prop_map(|who| Op::Settle { who }),
        (who.clone(), amount).prop_map(|(to, amount)| Op::Airdrop { to, amount }),
        (who, any::<bool>()).prop_map(|(who, blocked)| Op::Block { who, blocked }),
    ]
}

fn apply(ledger: &impl TokenLedgerApi, op: &Op) -> Result<(), LedgerError> {
    match *op {
        Op::Transfer { from, to, amount } => ledger.transfer(party(from), party(to), amount),
        Op::Stake { who, amount } => ledger.stake(party(who), amount),
        Op::Withdraw { who, amount } => ledger.withdraw(party(who), amount),
        Op::Settle { who } => ledger.withdraw_pending_withdrawals(OWNER, party(who)).map(|_| ()),
        Op::Airdrop { to, amount } => ledger.airdrop(OWNER, amount, party(to)),
        Op::Block { who, blocked } => {
            if blocked {
                ledger.block_account(OWNER, party(who))
            } else {
                ledger.unblock_account(OWNER, party(who))
            }
        }
    }
}

fn snapshot(ledger: &impl TokenLedgerApi) -> Vec<AccountState> {
    (0..4).map(|i| ledger.account(party(i))).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_value_is_conserved(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let ledger = create_test_service(OWNER);
        ledger.transfer(OWNER, party(1), tokens(500)).unwrap();
        ledger.transfer(OWNER, party(2), tokens(500)).unwrap();

        for op in &ops {
            let _ = apply(&ledger, op);
        }

        let held: Amount = snapshot(&ledger)
            .iter()
            .map(|a| a.balance + a.staked + a.pending_withdrawal + a.settled)
            .sum();
        let stats = ledger.supply_stats();
        prop_assert_eq!(held, stats.minted + stats.airdropped);
        prop_assert_eq!(stats.circulating_supply, stats.minted);
        let settled: Amount = snapshot(&ledger).iter().map(|a| a.settled).sum();
        prop_assert_eq!(ledger.settlement().total_settled(), settled);
        prop_assert!(ledger.verify_invariants().is_empty());
    }

    #[test]
    fn prop_rejected_ops_change_nothing(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let ledger = create_test_service(OWNER);
        ledger.transfer(OWNER, party(1), tokens(100)).unwrap();

        for op in &ops {
            let before = snapshot(&ledger);
            let supply_before = ledger.supply_stats();
            if apply(&ledger, op).is_err() {
                prop_assert_eq!(snapshot(&ledger), before);
                prop_assert_eq!(ledger.supply_stats(), supply_before);
            }
        }
    }

    #[test]
    fn prop_transfer_moves_amount_and_stake(
        balance in 1u128..tokens(1_000),
        stake_share in 0u128..=100,
        send_share in 0u128..=100,
    ) {
        let ledger = create_test_service(OWNER);
        let (alice, bob) = (party(1), party(2));
        ledger.transfer(OWNER, alice, balance).unwrap();

        let staked = balance * stake_share / 100;
        ledger.stake(alice, staked).unwrap();
        let amount = (balance - staked) * send_share / 100;

        let holdings = |a: Address| ledger.account(a).holdings().unwrap();
        let before = holdings(alice) + holdings(bob);
        ledger.transfer(alice, bob, amount).unwrap();

        prop_assert_eq!(ledger.staked(alice), 0);
        prop_assert_eq!(ledger.staked(bob), staked);
        prop_assert_eq!(ledger.balance_of(bob), amount);
        prop_assert_eq!(ledger.balance_of(alice), balance - staked - amount);
        prop_assert_eq!(before, holdings(alice) + holdings(bob));
    }
}
