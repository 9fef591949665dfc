use crate::cli::RulesArgs;
use crate::error::Result;
use molab::core::bonding::BondingRuleTable;
use tracing::info;

pub fn run(args: RulesArgs) -> Result<()> {
    let table = match &args.table {
        Some(path) => {
            info!("Loading bonding rules from {:?}", path);
            BondingRuleTable::from_csv(path)?
        }
        None => BondingRuleTable::standard(),
    };

    print!("{}", render(&table));
    Ok(())
}

fn render(table: &BondingRuleTable) -> String {
    let rows = table
        .iter()
        .flat_map(|(pair, rules)| rules.iter().map(move |rule| (pair, rule)));

    let mut out = format!(
        "{:<8} {:<8} {:>12} {:>12}\n",
        "PAIR", "ORDER", "IDEAL (Å)", "MAX (Å)"
    );
    for (pair, rule) in rows {
        out.push_str(&format!(
            "{:<8} {:<8} {:>12.3} {:>12.3}\n",
            pair,
            rule.order.to_string(),
            rule.ideal_length,
            rule.max_distance
        ));
    }
    out.push_str(&format!("{} rule(s)\n", table.rule_count()));
    out
}
