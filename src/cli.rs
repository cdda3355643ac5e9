// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON value per line"),
    )
}

fn loan_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("lender")
            .long("lender")
            .required(required)
            .help("Kredietverstrekker"),
    )
    .arg(
        Arg::new("type")
            .long("type")
            .required(required)
            .help("Loan type, e.g. Hypotheek"),
    )
    .arg(
        Arg::new("start")
            .long("start")
            .required(required)
            .help("Start date YYYY-MM-DD"),
    )
    .arg(Arg::new("end").long("end").help("End date YYYY-MM-DD"))
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(required)
            .help("Principal amount"),
    )
    .arg(
        Arg::new("rate")
            .long("rate")
            .required(required)
            .help("Interest rate percentage"),
    )
    .arg(
        Arg::new("rate-type")
            .long("rate-type")
            .help("Vast | Variabel (default Vast)"),
    )
    .arg(
        Arg::new("status")
            .long("status")
            .help("Lopend | Afgelost | In aanvraag (default Lopend)"),
    )
    .arg(Arg::new("note").long("note").help("Opmerkingen"))
}

fn payment_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("loan")
            .long("loan")
            .required(required)
            .help("lening_id the payment belongs to"),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .required(required)
            .help("Payment date YYYY-MM-DD"),
    )
    .arg(
        Arg::new("principal")
            .long("principal")
            .required(required)
            .help("Aflossing (principal reduction)"),
    )
    .arg(
        Arg::new("interest")
            .long("interest")
            .required(required)
            .help("Rente (interest)"),
    )
    .arg(
        Arg::new("amount")
            .long("amount")
            .help("Termijnbedrag; defaults to principal + interest"),
    )
    .arg(
        Arg::new("status")
            .long("status")
            .help("Betaald | Ingepland | Te laat (default Betaald)"),
    )
}

fn year_arg() -> Arg {
    Arg::new("year").required(true).help("Calendar year, e.g. 2024")
}

pub fn build_cli() -> Command {
    Command::new("leningen")
        .about("Track loans, repayments and yearly overviews")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("SQLite database file (default: $LENINGEN_DB or the user data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("loan")
                .about("Manage loans")
                .subcommand_required(true)
                .subcommand(loan_fields(
                    Command::new("add")
                        .about("Add a loan")
                        .arg(Arg::new("id").long("id").help("lening_id (default: generated)")),
                    true,
                ))
                .subcommand(json_flags(Command::new("list").about("List loans")))
                .subcommand(loan_fields(
                    Command::new("update")
                        .about("Change fields of a loan")
                        .arg(Arg::new("id").required(true)),
                    false,
                ))
                .subcommand(
                    Command::new("rm")
                        .about("Remove a loan and its payments")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("payment")
                .about("Manage payments")
                .subcommand_required(true)
                .subcommand(payment_fields(
                    Command::new("add")
                        .about("Record a payment")
                        .arg(Arg::new("id").long("id").help("betaling_id (default: generated)")),
                    true,
                ))
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List payments, newest first")
                        .arg(Arg::new("year").long("year"))
                        .arg(Arg::new("loan").long("loan"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(payment_fields(
                    Command::new("update")
                        .about("Change fields of a payment")
                        .arg(Arg::new("id").required(true)),
                    false,
                ))
                .subcommand(
                    Command::new("rm")
                        .about("Remove a payment")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("year")
                        .about("Principal and interest per loan for one year")
                        .arg(year_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("monthly")
                        .about("Principal and interest per month for one year")
                        .arg(year_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("lenders").about("Borrowed principal per lender"),
                ))
                .subcommand(json_flags(
                    Command::new("dashboard")
                        .about("Headline totals for one year")
                        .arg(year_arg()),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("payments")
                        .about("Export payments to CSV or JSON")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(Arg::new("year").long("year")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check payments for inconsistencies"))
        .subcommand(
            Command::new("serve")
                .about("Run the REST API")
                .arg(Arg::new("host").long("host").help("Listen address (default $HOST or 127.0.0.1)"))
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_parser(value_parser!(u16))
                        .help("Listen port (default $PORT or 3000)"),
                ),
        )
}
