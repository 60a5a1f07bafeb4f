//! CLI `route` command: show which handler a message would reach.

use mcai::query::Query;
use mcai::router::Router;

/// Print the route and matching rule for a message.
pub fn route(message: &str) {
    let router = Router::default();
    let decision = router.decide(&Query::new(message));

    println!("Route:  {}", decision.route);
    println!("Rule:   {}", decision.rule.unwrap_or("(none, default)"));
    println!();
    println!("Rules checked in order:");
    for (i, name) in router.rule_names().iter().enumerate() {
        let marker = if Some(*name) == decision.rule { "  <-" } else { "" };
        println!("  {}. {name}{marker}", i + 1);
    }
}
