// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use leningen::models::{LoanInput, LoanStatus, PaymentInput, PaymentStatus, RateType};
use leningen::summary::Year;
use leningen::{Error, db, store};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn loan_input(id: Option<&str>, lender: &str) -> LoanInput {
    LoanInput {
        id: id.map(|s| s.to_string()),
        lender: lender.into(),
        loan_type: "Hypotheek".into(),
        start_date: date("2020-01-01"),
        end_date: Some(date("2050-01-01")),
        principal: dec!(250000),
        interest_rate: dec!(3.45),
        rate_type: RateType::Fixed,
        status: LoanStatus::Active,
        notes: None,
    }
}

fn payment_input(id: &str, loan: &str, d: &str) -> PaymentInput {
    PaymentInput {
        id: Some(id.into()),
        loan_id: loan.into(),
        date: date(d),
        installment: dec!(120.00),
        principal: dec!(100.00),
        interest: dec!(20.00),
        status: PaymentStatus::Paid,
    }
}

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    store::create_loan(&conn, loan_input(Some("L1"), "BankA")).unwrap();
    conn
}

#[test]
fn create_generates_id_and_rounds_amounts() {
    let conn = db::open_in_memory().unwrap();
    let mut input = loan_input(None, "  BankB ");
    input.principal = dec!(1000.005);
    input.interest_rate = dec!(2.345);
    input.notes = Some("   ".into());
    let loan = store::create_loan(&conn, input).unwrap();
    assert!(uuid::Uuid::parse_str(&loan.id).is_ok());
    assert_eq!(loan.lender, "BankB");
    // ties round away from zero
    assert_eq!(loan.principal.to_string(), "1000.01");
    assert_eq!(loan.interest_rate.to_string(), "2.35");
    assert_eq!(loan.notes, None);
    assert_eq!(store::find_loan(&conn, &loan.id).unwrap(), loan);
}

#[test]
fn amounts_are_capped_at_fifteen_digits() {
    let conn = setup();

    let mut input = loan_input(None, "BankA");
    input.principal = dec!(9999999999999.99);
    let loan = store::create_loan(&conn, input).unwrap();
    assert_eq!(loan.principal, dec!(9999999999999.99));

    let mut input = loan_input(None, "BankA");
    input.principal = dec!(10000000000000);
    assert!(matches!(store::create_loan(&conn, input), Err(Error::Validation(_))));

    // rounds up past the cap
    let mut input = loan_input(None, "BankA");
    input.principal = dec!(9999999999999.995);
    assert!(matches!(store::create_loan(&conn, input), Err(Error::Validation(_))));

    let mut input = payment_input("P1", "L1", "2024-01-01");
    input.principal = dec!(50000000000000000000000000000);
    assert!(matches!(store::create_payment(&conn, input), Err(Error::Validation(_))));
    let mut input = payment_input("P1", "L1", "2024-01-01");
    input.installment = dec!(10000000000000.00);
    assert!(matches!(store::create_payment(&conn, input), Err(Error::Validation(_))));
    assert!(store::find_all_payments(&conn, None).unwrap().is_empty());
}

#[test]
fn duplicate_loan_id_conflicts() {
    let conn = setup();
    let err = store::create_loan(&conn, loan_input(Some("L1"), "Other")).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err}");
}

#[test]
fn loan_validation() {
    let conn = db::open_in_memory().unwrap();

    let mut bad = loan_input(None, "BankA");
    bad.end_date = Some(date("2019-12-31"));
    assert!(matches!(store::create_loan(&conn, bad), Err(Error::Validation(_))));

    let mut bad = loan_input(None, "");
    bad.lender = " ".into();
    assert!(matches!(store::create_loan(&conn, bad), Err(Error::Validation(_))));

    let mut bad = loan_input(None, "BankA");
    bad.principal = dec!(-1);
    assert!(matches!(store::create_loan(&conn, bad), Err(Error::Validation(_))));

    let mut bad = loan_input(None, "BankA");
    bad.interest_rate = dec!(1000);
    assert!(matches!(store::create_loan(&conn, bad), Err(Error::Validation(_))));

    assert!(store::find_all_loans(&conn).unwrap().is_empty());
}

#[test]
fn update_replaces_fields_but_not_the_id() {
    let conn = setup();
    let mut input = loan_input(None, "BankA");
    input.status = LoanStatus::Repaid;
    input.rate_type = RateType::Variable;
    input.notes = Some("oversluiting".into());
    let loan = store::update_loan(&conn, "L1", input).unwrap();
    assert_eq!(loan.id, "L1");
    assert_eq!(loan.status, LoanStatus::Repaid);
    assert_eq!(loan.rate_type, RateType::Variable);
    assert_eq!(loan.notes.as_deref(), Some("oversluiting"));

    let err = store::update_loan(&conn, "L1", loan_input(Some("L2"), "BankA")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    // repeating the same id is fine
    assert!(store::update_loan(&conn, "L1", loan_input(Some("L1"), "BankA")).is_ok());

    let err = store::update_loan(&conn, "nope", loan_input(None, "BankA")).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn payments_must_reference_an_existing_loan() {
    let conn = setup();
    let err = store::create_payment(&conn, payment_input("P1", "L9", "2024-01-01")).unwrap_err();
    assert!(matches!(err, Error::UnknownLoan(ref id) if id == "L9"));

    store::create_payment(&conn, payment_input("P1", "L1", "2024-01-01")).unwrap();
    let err = store::update_payment(&conn, "P1", payment_input("P1", "L9", "2024-01-01"))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownLoan(_)));

    let err = store::update_payment(&conn, "P404", payment_input("P404", "L9", "2024-01-01"))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn payment_update_and_delete() {
    let conn = setup();
    store::create_loan(&conn, loan_input(Some("L2"), "BankB")).unwrap();
    store::create_payment(&conn, payment_input("P1", "L1", "2024-01-01")).unwrap();

    let mut input = payment_input("P1", "L2", "2024-02-01");
    input.status = PaymentStatus::Late;
    let p = store::update_payment(&conn, "P1", input).unwrap();
    assert_eq!(p.loan_id, "L2");
    assert_eq!(p.date, date("2024-02-01"));
    assert_eq!(p.status, PaymentStatus::Late);

    let err = store::update_payment(&conn, "P1", payment_input("P2", "L2", "2024-02-01"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    store::delete_payment(&conn, "P1").unwrap();
    assert!(matches!(
        store::delete_payment(&conn, "P1"),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn deleting_a_loan_removes_its_payments() {
    let conn = setup();
    store::create_payment(&conn, payment_input("P1", "L1", "2024-01-01")).unwrap();
    store::create_payment(&conn, payment_input("P2", "L1", "2024-02-01")).unwrap();
    store::delete_loan(&conn, "L1").unwrap();
    assert!(store::find_all_payments(&conn, None).unwrap().is_empty());
    assert!(matches!(
        store::delete_loan(&conn, "L1"),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn year_range_query_includes_both_literal_bounds() {
    let conn = setup();
    for (id, d) in [
        ("a", "2023-12-31"),
        ("b", "2024-01-01"),
        ("c", "2024-07-15"),
        ("d", "2024-12-31"),
        ("e", "2025-01-01"),
    ] {
        store::create_payment(&conn, payment_input(id, "L1", d)).unwrap();
    }
    let range = Year::parse("2024").unwrap().range();
    let ids: Vec<String> = store::find_all_payments(&conn, Some(&range))
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["b", "c", "d"]);
    assert_eq!(store::find_all_payments(&conn, None).unwrap().len(), 5);
}

#[test]
fn orphans_are_found_when_foreign_keys_were_off() {
    let conn = setup();
    store::create_payment(&conn, payment_input("P1", "L1", "2024-01-01")).unwrap();
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         INSERT INTO betalingen(betaling_id, lening_id, datum, termijnbedrag, aflossing, rente)
         VALUES ('P9', 'GONE', '2024-03-01', '10', '8', '2');
         PRAGMA foreign_keys = ON;",
    )
    .unwrap();
    let orphans = store::find_orphan_payments(&conn).unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].id, "P9");
    assert_eq!(orphans[0].status, PaymentStatus::Paid);
}
