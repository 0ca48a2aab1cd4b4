// ═══════════════════════════════════════════════════════════════════
// Service Tests — IngestionService, GoalService, LedgerService
// ═══════════════════════════════════════════════════════════════════

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use finance_vault_core::errors::CoreError;
use finance_vault_core::models::category::Category;
use finance_vault_core::models::goal::Goal;
use finance_vault_core::models::snapshot::FinanceSnapshot;
use finance_vault_core::models::transaction::{
    CategoryKind, Transaction, TransactionDraft, TransactionType,
};
use finance_vault_core::services::goal_service::GoalService;
use finance_vault_core::services::ingestion_service::{
    IngestionService, GENERIC_WITHDRAWAL_DESCRIPTION,
};
use finance_vault_core::services::ledger_service::LedgerService;

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_goal(name: &str, target: f64) -> Goal {
    Goal {
        id: Uuid::new_v4(),
        name: name.into(),
        target_amount: target,
        user_id: Uuid::nil(),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
    }
}

fn tx(description: &str, amount: f64, kind: TransactionType, settled: bool) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        description: description.into(),
        amount,
        kind,
        category: "POUPANÇA".into(),
        date: make_date(2025, 6, 10),
        settled,
        user_id: Uuid::nil(),
        goal_id: None,
    }
}

// ═══════════════════════════════════════════════════════════════════
// IngestionService — transactions
// ═══════════════════════════════════════════════════════════════════

mod ingestion_transactions {
    use super::*;

    #[test]
    fn normalizes_labels_and_starts_pending() {
        let user = Uuid::new_v4();
        let draft = TransactionDraft::new("  mercado central ", 120.5, TransactionType::Outflow, make_date(2025, 6, 3))
            .with_category(" lazer");
        let t = IngestionService::new().build_transaction(&draft, user).unwrap();

        assert_eq!(t.description, "MERCADO CENTRAL");
        assert_eq!(t.category, "LAZER");
        assert_eq!(t.amount, 120.5);
        assert_eq!(t.kind, TransactionType::Outflow);
        assert_eq!(t.date, make_date(2025, 6, 3));
        assert_eq!(t.user_id, user);
        assert!(!t.settled);
        assert_eq!(t.goal_id, None);
    }

    #[test]
    fn blank_category_falls_back_to_default() {
        let draft = TransactionDraft::new("pix", 10.0, TransactionType::Inflow, make_date(2025, 6, 3))
            .with_category("   ");
        let t = IngestionService::new().build_transaction(&draft, Uuid::nil()).unwrap();
        assert_eq!(t.category, "GERAL");
    }

    #[test]
    fn carries_goal_link() {
        let goal_id = Uuid::new_v4();
        let draft = TransactionDraft::new("viagem", 10.0, TransactionType::Outflow, make_date(2025, 6, 3))
            .with_goal(goal_id);
        let t = IngestionService::new().build_transaction(&draft, Uuid::nil()).unwrap();
        assert_eq!(t.goal_id, Some(goal_id));
    }

    #[test]
    fn ids_are_unique() {
        let draft = TransactionDraft::new("pix", 10.0, TransactionType::Inflow, make_date(2025, 6, 3));
        let service = IngestionService::new();
        let a = service.build_transaction(&draft, Uuid::nil()).unwrap();
        let b = service.build_transaction(&draft, Uuid::nil()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn rejects_missing_amount() {
        let mut draft = TransactionDraft::new("pix", 10.0, TransactionType::Inflow, make_date(2025, 6, 3));
        draft.amount = None;
        let err = IngestionService::new().build_transaction(&draft, Uuid::nil()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn rejects_non_positive_and_non_finite_amounts() {
        let service = IngestionService::new();
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let draft = TransactionDraft::new("pix", amount, TransactionType::Inflow, make_date(2025, 6, 3));
            let result = service.build_transaction(&draft, Uuid::nil());
            assert!(matches!(result, Err(CoreError::Validation(_))), "amount {amount} accepted");
        }
    }

    #[test]
    fn rejects_blank_description() {
        let draft = TransactionDraft::new("   ", 10.0, TransactionType::Inflow, make_date(2025, 6, 3));
        let err = IngestionService::new().build_transaction(&draft, Uuid::nil()).unwrap_err();
        assert!(err.to_string().contains("description"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// IngestionService — vault withdrawals, goals, categories
// ═══════════════════════════════════════════════════════════════════

mod ingestion_withdrawals_goals_categories {
    use super::*;

    #[test]
    fn withdrawal_for_a_goal() {
        let goal = make_goal("Viagem", 1000.0);
        let today = make_date(2025, 6, 18);
        let t = IngestionService::new()
            .build_vault_withdrawal(75.0, Some(&goal), Uuid::nil(), today)
            .unwrap();

        assert_eq!(t.description, "VIAGEM");
        assert_eq!(t.goal_id, Some(goal.id));
        assert_eq!(t.category, "SAQUE COFRE");
        assert_eq!(t.category_kind(), CategoryKind::VaultWithdrawal);
        assert_eq!(t.kind, TransactionType::Inflow);
        assert_eq!(t.date, today);
        assert!(t.settled);
    }

    #[test]
    fn generic_withdrawal() {
        let t = IngestionService::new()
            .build_vault_withdrawal(75.0, None, Uuid::nil(), make_date(2025, 6, 18))
            .unwrap();
        assert_eq!(t.description, GENERIC_WITHDRAWAL_DESCRIPTION);
        assert_eq!(t.goal_id, None);
    }

    #[test]
    fn withdrawal_rejects_bad_amount() {
        let service = IngestionService::new();
        for amount in [0.0, -1.0, f64::NAN] {
            assert!(service
                .build_vault_withdrawal(amount, None, Uuid::nil(), make_date(2025, 6, 18))
                .is_err());
        }
    }

    #[test]
    fn goal_is_normalized() {
        let owner = Uuid::new_v4();
        let goal = IngestionService::new().build_goal(" carro novo ", 25_000.0, owner).unwrap();
        assert_eq!(goal.name, "CARRO NOVO");
        assert_eq!(goal.target_amount, 25_000.0);
        assert_eq!(goal.user_id, owner);
    }

    #[test]
    fn goal_rejects_blank_name_or_bad_target() {
        let service = IngestionService::new();
        assert!(matches!(service.build_goal("  ", 10.0, Uuid::nil()), Err(CoreError::Validation(_))));
        assert!(matches!(service.build_goal("X", 0.0, Uuid::nil()), Err(CoreError::Validation(_))));
        assert!(matches!(service.build_goal("X", -3.0, Uuid::nil()), Err(CoreError::Validation(_))));
    }

    #[test]
    fn category_is_normalized_and_classified() {
        let service = IngestionService::new();
        let c = service.build_category("poupança").unwrap();
        assert_eq!(c.name, "POUPANÇA");
        assert_eq!(c.kind(), CategoryKind::VaultDeposit);

        let c = service.build_category("lazer").unwrap();
        assert_eq!(c.kind(), CategoryKind::Normal);
    }

    #[test]
    fn category_rejects_blank_name() {
        assert!(IngestionService::new().build_category(" ").is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// GoalService
// ═══════════════════════════════════════════════════════════════════

mod goals {
    use super::*;

    #[test]
    fn progress_counts_settled_deposits_only() {
        let goal = make_goal("VIAGEM", 1000.0);
        let txs = vec![
            tx("VIAGEM", 400.0, TransactionType::Outflow, true),
            tx("VIAGEM", 100.0, TransactionType::Outflow, false),
            tx("OUTRA COISA", 300.0, TransactionType::Outflow, true),
        ];
        let p = GoalService::new().progress(&goal, &txs);

        assert_eq!(p.goal_id, goal.id);
        assert_eq!(p.accumulated, 400.0);
        assert!((p.progress_percent - 40.0).abs() < 1e-9);
        assert_eq!(p.remaining(), 600.0);
        assert!(!p.is_complete());
    }

    #[test]
    fn withdrawals_reduce_progress() {
        let goal = make_goal("VIAGEM", 1000.0);
        let mut withdrawal = tx("VIAGEM", 100.0, TransactionType::Inflow, true);
        withdrawal.category = "SAQUE COFRE".into();
        let txs = vec![tx("VIAGEM", 400.0, TransactionType::Outflow, true), withdrawal];

        let p = GoalService::new().progress(&goal, &txs);
        assert_eq!(p.accumulated, 300.0);
        assert!((p.progress_percent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn progress_is_clamped() {
        let goal = make_goal("VIAGEM", 100.0);
        let over = vec![tx("VIAGEM", 250.0, TransactionType::Outflow, true)];
        let p = GoalService::new().progress(&goal, &over);
        assert!((p.progress_percent - 100.0).abs() < 1e-9);
        assert_eq!(p.remaining(), 0.0);
        assert!(p.is_complete());

        let under = vec![tx("VIAGEM", 50.0, TransactionType::Inflow, true)];
        let p = GoalService::new().progress(&goal, &under);
        assert_eq!(p.accumulated, -50.0);
        assert!(p.progress_percent.abs() < 1e-9);
    }

    #[test]
    fn name_match_ignores_case_and_whitespace() {
        let goal = make_goal("VIAGEM", 1000.0);
        let txs = vec![tx(" viagem ", 200.0, TransactionType::Outflow, true)];
        assert_eq!(GoalService::new().progress(&goal, &txs).accumulated, 200.0);
    }

    #[test]
    fn explicit_link_wins_over_name() {
        let viagem = make_goal("VIAGEM", 1000.0);
        let carro = make_goal("CARRO", 1000.0);
        let mut linked_elsewhere = tx("VIAGEM", 500.0, TransactionType::Outflow, true);
        linked_elsewhere.goal_id = Some(carro.id);
        let mut linked_by_id = tx("DEPOSITO AVULSO", 150.0, TransactionType::Outflow, true);
        linked_by_id.goal_id = Some(viagem.id);
        let txs = vec![linked_elsewhere, linked_by_id];

        let service = GoalService::new();
        assert_eq!(service.progress(&viagem, &txs).accumulated, 150.0);
        assert_eq!(service.progress(&carro, &txs).accumulated, 500.0);
    }

    #[test]
    fn progress_all_keeps_goal_order() {
        let goals = vec![make_goal("A", 10.0), make_goal("B", 10.0)];
        let all = GoalService::new().progress_all(&goals, &[]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "A");
        assert_eq!(all[1].name, "B");
        assert!(all.iter().all(|p| p.accumulated == 0.0));
    }

    #[test]
    fn backfill_links_unique_name_matches() {
        let viagem = make_goal("VIAGEM", 1000.0);
        let carro = make_goal("CARRO", 1000.0);
        let legacy = tx("viagem", 100.0, TransactionType::Outflow, true);
        let already = {
            let mut t = tx("CARRO", 100.0, TransactionType::Outflow, true);
            t.goal_id = Some(carro.id);
            t
        };
        let unrelated = tx("MERCADO", 100.0, TransactionType::Outflow, true);

        let links = GoalService::new().backfill_links(
            &[viagem.clone(), carro],
            &[legacy.clone(), already, unrelated],
        );
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].transaction_id, legacy.id);
        assert_eq!(links[0].goal_id, viagem.id);
    }

    #[test]
    fn backfill_skips_ambiguous_names() {
        let a = make_goal("VIAGEM", 1000.0);
        let b = make_goal("VIAGEM", 2000.0);
        let txs = vec![tx("VIAGEM", 100.0, TransactionType::Outflow, true)];
        assert!(GoalService::new().backfill_links(&[a, b], &txs).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// LedgerService
// ═══════════════════════════════════════════════════════════════════

mod ledger {
    use super::*;

    fn dated(description: &str, date: NaiveDate) -> Transaction {
        let mut t = tx(description, 10.0, TransactionType::Outflow, false);
        t.date = date;
        t
    }

    #[test]
    fn transactions_stay_sorted_by_date() {
        let ledger = LedgerService::new();
        let mut snapshot = FinanceSnapshot::default();
        ledger.insert_transaction(&mut snapshot, dated("C", make_date(2025, 6, 20))).unwrap();
        ledger.insert_transaction(&mut snapshot, dated("A", make_date(2025, 6, 1))).unwrap();
        ledger.insert_transaction(&mut snapshot, dated("B", make_date(2025, 6, 10))).unwrap();
        ledger.insert_transaction(&mut snapshot, dated("B2", make_date(2025, 6, 10))).unwrap();

        let names: Vec<&str> = snapshot.transactions.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "B2", "C"]);
    }

    #[test]
    fn duplicate_id_rejected() {
        let ledger = LedgerService::new();
        let mut snapshot = FinanceSnapshot::default();
        let t = dated("A", make_date(2025, 6, 1));
        ledger.insert_transaction(&mut snapshot, t.clone()).unwrap();
        assert!(matches!(
            ledger.insert_transaction(&mut snapshot, t),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn settle_link_and_remove() {
        let ledger = LedgerService::new();
        let mut snapshot = FinanceSnapshot::default();
        let t = dated("A", make_date(2025, 6, 1));
        let id = t.id;
        ledger.insert_transaction(&mut snapshot, t).unwrap();

        ledger.set_settled(&mut snapshot, id, true).unwrap();
        assert!(snapshot.transactions[0].settled);

        let goal_id = Uuid::new_v4();
        ledger.set_goal_link(&mut snapshot, id, Some(goal_id)).unwrap();
        assert_eq!(snapshot.transactions[0].goal_id, Some(goal_id));

        let removed = ledger.remove_transaction(&mut snapshot, id).unwrap();
        assert_eq!(removed.id, id);
        assert!(snapshot.transactions.is_empty());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let ledger = LedgerService::new();
        let mut snapshot = FinanceSnapshot::default();
        let missing = Uuid::new_v4();

        assert!(matches!(
            ledger.set_settled(&mut snapshot, missing, true),
            Err(CoreError::NotFound { entity: "Transaction", .. })
        ));
        assert!(matches!(
            ledger.remove_goal(&mut snapshot, missing),
            Err(CoreError::NotFound { entity: "Goal", .. })
        ));
        assert!(matches!(
            ledger.remove_category(&mut snapshot, missing),
            Err(CoreError::NotFound { entity: "Category", .. })
        ));
    }

    #[test]
    fn categories_sorted_by_name_and_goals_by_creation() {
        let ledger = LedgerService::new();
        let mut snapshot = FinanceSnapshot::default();
        ledger.insert_category(&mut snapshot, Category::new("lazer"));
        ledger.insert_category(&mut snapshot, Category::new("casa"));
        ledger.insert_category(&mut snapshot, Category::new("mercado"));
        let names: Vec<&str> = snapshot.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["CASA", "LAZER", "MERCADO"]);

        let older = make_goal("ANTIGA", 10.0);
        let mut newer = make_goal("NOVA", 10.0);
        newer.created_at = older.created_at + Duration::days(3);
        ledger.insert_goal(&mut snapshot, newer);
        ledger.insert_goal(&mut snapshot, older);
        assert_eq!(snapshot.goals[0].name, "ANTIGA");
        assert_eq!(snapshot.goals[1].name, "NOVA");
    }
}
