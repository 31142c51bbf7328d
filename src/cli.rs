// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true).help("Document id")
}

fn list_args(cmd: Command) -> Command {
    json_flags(
        cmd.arg(Arg::new("search").long("search").short('s'))
            .arg(Arg::new("sort").long("sort").help("Sort field"))
            .arg(
                Arg::new("order")
                    .long("order")
                    .value_parser(["asc", "desc"])
                    .default_value("asc"),
            )
            .arg(
                Arg::new("page")
                    .long("page")
                    .value_parser(value_parser!(u32))
                    .default_value("1"),
            )
            .arg(
                Arg::new("limit")
                    .long("limit")
                    .value_parser(value_parser!(u32))
                    .default_value("20"),
            ),
    )
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Export to a dated CSV file")
        .arg(
            Arg::new("dir")
                .long("dir")
                .default_value(".")
                .help("Target directory"),
        )
}

/// Fields shared by `add` and `update`. On `update` nothing is required and
/// nothing has a default, so absent flags keep the stored value.
fn product_form(cmd: Command, update: bool) -> Command {
    let track_stock = if update {
        Arg::new("track-stock")
            .long("track-stock")
            .value_parser(value_parser!(bool))
    } else {
        Arg::new("track-stock")
            .long("track-stock")
            .action(ArgAction::SetTrue)
    };
    cmd.arg(Arg::new("name").long("name").required(!update))
        .arg(Arg::new("sku").long("sku"))
        .arg(Arg::new("barcode").long("barcode"))
        .arg(Arg::new("quantity").long("quantity"))
        .arg(Arg::new("unit").long("unit"))
        .arg(Arg::new("purchase-price").long("purchase-price"))
        .arg(Arg::new("sale-price").long("sale-price"))
        .arg(Arg::new("currency").long("currency"))
        .arg(Arg::new("critical-level").long("critical-level"))
        .arg(track_stock)
        .arg(Arg::new("category").long("category"))
        .arg(Arg::new("brand").long("brand"))
        .arg(Arg::new("tag").long("tag").action(ArgAction::Append))
        .arg(Arg::new("oem").long("oem"))
}

fn partner_form(cmd: Command, update: bool) -> Command {
    cmd.arg(Arg::new("name").long("name").required(!update))
        .arg(Arg::new("email").long("email"))
        .arg(Arg::new("phone").long("phone"))
        .arg(Arg::new("address").long("address"))
        .arg(Arg::new("tax-number").long("tax-number"))
        .arg(Arg::new("tax-office").long("tax-office"))
}

fn partner_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand(list_args(Command::new("list")).arg(
            Arg::new("with-debt")
                .long("with-debt")
                .action(ArgAction::SetTrue)
                .help("Fetch the balance of every row"),
        ))
        .subcommand(partner_form(Command::new("add"), false))
        .subcommand(partner_form(Command::new("update").arg(id_arg()), true))
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(json_flags(Command::new("debt").arg(id_arg())))
        .subcommand(
            Command::new("adjust")
                .about("Post a debt adjustment so the balance becomes --target")
                .arg(id_arg())
                .arg(Arg::new("target").long("target").required(true))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("note").long("note")),
        )
        .subcommand(export_cmd())
}

fn account_form(cmd: Command, update: bool) -> Command {
    cmd.arg(Arg::new("name").long("name").required(!update))
        .arg(
            Arg::new("type")
                .long("type")
                .required(!update)
                .value_parser(["cash", "bank", "credit_card", "personnel", "cari"]),
        )
        .arg(
            Arg::new("cari-type")
                .long("cari-type")
                .value_parser(["customer", "supplier"]),
        )
        .arg(Arg::new("balance").long("balance"))
        .arg(Arg::new("currency").long("currency"))
}

fn classifier_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand(Command::new("list"))
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

pub fn build_cli() -> Command {
    Command::new("carihesap")
        .version(crate_version!())
        .about("Stok, fatura ve cari hesap yönetimi")
        .subcommand(Command::new("init").about("Create the local session store"))
        .subcommand(
            Command::new("config")
                .about("API connection settings")
                .subcommand(Command::new("set-url").arg(Arg::new("url").long("url").required(true)))
                .subcommand(
                    Command::new("set-timeout").arg(
                        Arg::new("secs")
                            .long("secs")
                            .required(true)
                            .value_parser(value_parser!(u64)),
                    ),
                )
                .subcommand(Command::new("show")),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and store the token")
                .arg(Arg::new("username").long("username").required(true))
                .arg(Arg::new("password").long("password").required(true)),
        )
        .subcommand(Command::new("logout").about("Forget the stored token"))
        .subcommand(
            Command::new("product")
                .about("Products and stock")
                .subcommand(
                    list_args(Command::new("list"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("brand").long("brand"))
                        .arg(
                            Arg::new("critical")
                                .long("critical")
                                .action(ArgAction::SetTrue)
                                .help("Only products at or below critical stock"),
                        )
                        .arg(Arg::new("filter").long("filter").help("Client-side text filter")),
                )
                .subcommand(product_form(Command::new("add"), false))
                .subcommand(
                    product_form(Command::new("update").arg(id_arg()), true)
                        .about("Replace every field of a product"),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(
                    Command::new("suggest").arg(Arg::new("q").long("q").required(true)),
                )
                .subcommand(
                    Command::new("import-stock")
                        .about("Import a stock-count CSV")
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("count-type").long("count-type").default_value("full"))
                        .arg(
                            Arg::new("dry-run")
                                .long("dry-run")
                                .action(ArgAction::SetTrue)
                                .help("Print the payload instead of sending it"),
                        ),
                )
                .subcommand(export_cmd()),
        )
        .subcommand(partner_cmd("customer", "Customers (cari)"))
        .subcommand(partner_cmd("supplier", "Suppliers (cari)"))
        .subcommand(
            Command::new("account")
                .about("Company and cari accounts")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(account_form(Command::new("add"), false))
                .subcommand(account_form(Command::new("update").arg(id_arg()), true))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(Command::new("undo").about("Re-create the last deleted account"))
                .subcommand(json_flags(Command::new("statement").arg(id_arg())))
                .subcommand(
                    Command::new("transfer")
                        .about("Move money; parties are account:<id>, customer:<id> or supplier:<id>")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("date").long("date")),
                ),
        )
        .subcommand(
            Command::new("invoice")
                .about("Invoices and their status workflow")
                .subcommand(
                    list_args(Command::new("list"))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["draft", "approved", "paid", "canceled"]),
                        )
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["sale", "purchase", "return", "proforma"]),
                        ),
                )
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(
                    Command::new("create")
                        .about("Create a draft from a JSON form file")
                        .arg(Arg::new("file").long("file").required(true))
                        .arg(Arg::new("number").long("number").help("Override the invoice number")),
                )
                .subcommand(
                    Command::new("update")
                        .arg(id_arg())
                        .arg(Arg::new("file").long("file").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("totals")
                        .about("Validate a JSON form file and print its totals")
                        .arg(Arg::new("file").long("file").required(true)),
                ))
                .subcommand(
                    Command::new("actions")
                        .arg(id_arg())
                        .arg(Arg::new("admin").long("admin").action(ArgAction::SetTrue)),
                )
                .subcommand(Command::new("approve").arg(id_arg()))
                .subcommand(
                    Command::new("revert")
                        .arg(id_arg())
                        .arg(Arg::new("admin").long("admin").action(ArgAction::SetTrue)),
                )
                .subcommand(
                    Command::new("pay")
                        .about("Collect (sale) or pay (purchase/return) an approved invoice")
                        .arg(id_arg())
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(Arg::new("amount").long("amount").help("Defaults to the open amount"))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(Command::new("cancel").arg(id_arg()))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(export_cmd()),
        )
        .subcommand(classifier_cmd("category", "Product categories"))
        .subcommand(classifier_cmd("brand", "Product brands"))
        .subcommand(
            Command::new("tx")
                .about("Quick income/expense postings")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("customer").long("customer").conflicts_with("supplier"))
                        .arg(Arg::new("supplier").long("supplier"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("date").long("date")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("limit").long("limit").value_parser(value_parser!(u32))),
                )),
        )
        .subcommand(json_flags(
            Command::new("dashboard").about("Stock, invoice and cash overview"),
        ))
}
