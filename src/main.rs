//! vibeexpr - inspect how an IN predicate is bound, optimized and evaluated

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use vibeexpr::access::{DataType, Value};
use vibeexpr::catalog::TableFilter;
use vibeexpr::config::ExpressionConfig;
use vibeexpr::executor::{Executor, FilterExecutor, ValuesScanExecutor};
use vibeexpr::expression::{bind_columns, Expression, PreparedCondition};
use vibeexpr::session::Session;

/// Evaluate `column IN (values...)` over a set of rows
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the probed column
    #[arg(short, long, default_value = "X")]
    column: String,

    /// SQL type of the column (INT, BIGINT, BOOLEAN, VARCHAR)
    #[arg(short = 't', long = "type", default_value = "INT")]
    column_type: String,

    /// Column value of one row; repeat for more rows, NULL for SQL NULL
    #[arg(short, long = "row")]
    rows: Vec<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable IN-list range bounds
    #[arg(long)]
    no_optimize_in: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Candidate values of the IN list
    values: Vec<String>,
}

fn parse_value(text: &str, data_type: DataType) -> Result<Value> {
    if text.eq_ignore_ascii_case("NULL") {
        return Ok(Value::Null);
    }
    Value::from(text)
        .convert_to(data_type)
        .with_context(|| format!("Invalid {} value '{}'", data_type.sql_name(), text))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ExpressionConfig::load_from(path)?,
        None => ExpressionConfig::default(),
    };
    if args.no_optimize_in {
        config.optimize_in = false;
    }

    // Set up logging
    let log_level = if args.debug {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let data_type = DataType::from_sql_name(&args.column_type)
        .ok_or_else(|| anyhow!("Unknown column type '{}'", args.column_type))?;
    let candidates = args
        .values
        .iter()
        .map(|text| parse_value(text, data_type).map(Expression::literal))
        .collect::<Result<Vec<_>>>()?;
    let rows = args
        .rows
        .iter()
        .map(|text| parse_value(text, data_type).map(|v| vec![v]))
        .collect::<Result<Vec<_>>>()?;

    let filter = TableFilter::with_columns("T", &[(args.column.as_str(), data_type)]);
    let mut expr = Expression::in_list(Expression::column(args.column.as_str()), candidates);
    bind_columns(&mut expr, &[&[&filter]])?;
    println!("condition:  {}", expr.to_sql());

    let mut session = Session::new(config.clone());
    let condition = Arc::new(PreparedCondition::new(expr));
    condition.prepare(&session)?;
    println!("optimized:  {}", condition.to_sql());
    match condition.cached_bounds() {
        Some((min, max)) => println!("bounds:     [{}, {}]", min.to_sql(), max.to_sql()),
        None => println!("bounds:     (none)"),
    }

    let mut scan = ValuesScanExecutor::new(filter, rows.clone()).with_range_column(0);
    condition.create_index_conditions(&session, scan.filter_mut())?;
    let pushed: Vec<String> = scan
        .filter()
        .index_conditions()
        .iter()
        .map(|c| c.to_sql())
        .collect();
    if pushed.is_empty() {
        println!("index:      (none)");
    } else {
        println!("index:      {}", pushed.join(" AND "));
    }

    for row in &rows {
        session.set_current_row(scan.filter().id(), row.clone());
        let value = condition.evaluate(&session)?;
        println!("{:<10}  {}", row[0].to_sql(), value.to_sql());
    }

    let mut executor = FilterExecutor::new(Box::new(scan), Arc::clone(&condition));
    executor.init(&mut session)?;
    let mut matched = 0;
    while executor.next(&mut session)?.is_some() {
        matched += 1;
    }
    info!(
        "{} of {} rows matched (optimize_in = {})",
        matched,
        rows.len(),
        config.optimize_in
    );

    Ok(())
}
