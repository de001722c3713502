use cartomancy_core::{Session, Transaction};
use schemars::schema_for;
use serde_json::json;

fn main() {
    let bundle = json!({
        "session": schema_for!(Session),
        "transaction": schema_for!(Transaction),
    });
    let json = serde_json::to_string_pretty(&bundle).expect("serialize json schemas");
    println!("{json}");
}
