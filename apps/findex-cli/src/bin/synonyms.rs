use std::env;

use findex_core::config::{expand_path, Config};
use findex_synonyms::{JsonFileStorage, MergeKeep, QueryExpander, TermStore};

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!(
            "Usage: {} <list|get|add-term|add-variant|remove-term|remove-variant|update|merge|search|suggest|stats> [args...]",
            prog
        );
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn require(args: &[String], n: usize, usage: &str) {
    if args.len() < n {
        eprintln!("Usage: findex-synonyms {}", usage);
        std::process::exit(1);
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let synonyms_file = expand_path(config.get_or(
        "data.synonyms_file",
        "data/synonyms/financial_terms.json".to_string(),
    ));
    let mut store = TermStore::load(Box::new(JsonFileStorage::new(synonyms_file)))?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "list" => {
            for entry in store.all_terms() {
                println!("{}: {}", entry.canonical, entry.variants.join(", "));
            }
        }
        "get" => {
            require(&args, 1, "get <term>");
            let term = &args[0];
            let synonyms = store.synonyms_of(term);
            println!("canonical: {}", store.get_canonical(term));
            println!("synonyms: {}", synonyms.join(", "));
            println!("recognized: {}", store.validate(term));
        }
        "add-term" => {
            require(&args, 1, "add-term <canonical> [variants...]");
            let added = store.add_term(&args[0], &args[1..])?;
            println!("{}", if added { "Term added" } else { "Term already exists" });
        }
        "add-variant" => {
            require(&args, 2, "add-variant <canonical> <variant>");
            let added = store.add_variant(&args[0], &args[1])?;
            println!("{}", if added { "Variant added" } else { "Variant already exists" });
        }
        "remove-term" => {
            require(&args, 1, "remove-term <canonical>");
            let removed = store.remove_term(&args[0])?;
            println!("{}", if removed { "Term removed" } else { "Term not found" });
        }
        "remove-variant" => {
            require(&args, 2, "remove-variant <canonical> <variant>");
            let removed = store.remove_variant(&args[0], &args[1])?;
            println!("{}", if removed { "Variant removed" } else { "Variant not found" });
        }
        "update" => {
            require(&args, 1, "update <canonical> [variants...]");
            let updated = store.update_term(&args[0], &args[1..])?;
            println!("{}", if updated { "Term updated" } else { "Term not found" });
        }
        "merge" => {
            require(&args, 2, "merge <term1> <term2> [keep1|keep2]");
            let keep = match args.get(2).map(String::as_str) {
                Some("keep2") => MergeKeep::Second,
                _ => MergeKeep::First,
            };
            let merged = store.merge_terms(&args[0], &args[1], keep)?;
            println!("{}", if merged { "Terms merged" } else { "Merge failed: term not found" });
        }
        "search" => {
            require(&args, 1, "search <substring>");
            let hits = store.search(&args[0]);
            if hits.is_empty() {
                println!("No matches.");
            }
            for entry in hits {
                println!("{}: {}", entry.canonical, entry.variants.join(", "));
            }
        }
        "suggest" => {
            require(&args, 1, "suggest <prefix>");
            let expander = QueryExpander::new(&store);
            for term in expander.suggest_terms(&args[0]) {
                println!("{}", term);
            }
        }
        "stats" => {
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
