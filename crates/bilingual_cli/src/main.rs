//! Operator CLI over a SQLite-backed bilingual site.
//!
//! # Responsibility
//! - Manage records and translation links from the shell.
//! - Print the markup a front-end host would emit, for inspection.
//!
//! Language settings come from `BILINGUAL_*` variables; flags override them.

use bilingual_core::db::open_db;
use bilingual_core::{
    core_version, init_logging, logging_status, ping, BilingualSite, Category, ContentRecord,
    ContentStore, PageView, RecordId, SessionNonces, SiteConfig, SqliteContentStore,
    TemplateTable, PAGE_TEMPLATE_META_KEY,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "bilingual")]
#[command(about = "Translation links between pages in two languages")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "BILINGUAL_DB", default_value = "bilingual.db", value_name = "PATH")]
    db: PathBuf,

    /// Locale of primary records (overrides BILINGUAL_FIRST_LOCALE)
    #[arg(long, value_name = "TAG")]
    first_locale: Option<String>,

    /// Language of secondary records (overrides BILINGUAL_SECOND_LANG)
    #[arg(long, value_name = "TAG")]
    second_lang: Option<String>,

    /// Public URL prefix of permalinks (overrides BILINGUAL_BASE_URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Write rolling log files into this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Log level used with --log-dir
    #[arg(long, default_value = bilingual_core::default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check core linkage
    Ping,
    /// Print the secondary category registration as JSON
    Category,
    /// Create a record and print its ID
    Add {
        #[arg(value_parser = parse_category)]
        category: Category,
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
    },
    /// List records of one category as JSON
    List {
        #[arg(value_parser = parse_category)]
        category: Category,
    },
    /// Link a record to a partner, or clear its link when --to is omitted
    Link {
        id: RecordId,
        #[arg(long)]
        to: Option<RecordId>,
    },
    /// Print the edit panel markup of a record
    Panel { id: RecordId },
    /// Print the lang attribute and head links of a record page
    Head { id: RecordId },
    /// Store the page template name of a record
    TemplateSet { id: RecordId, template: String },
    /// Resolve the template file a record page renders with
    Template {
        id: RecordId,
        /// Template the host would use otherwise
        #[arg(long, value_name = "PATH")]
        host: PathBuf,
        /// Theme template as NAME=PATH, repeatable
        #[arg(long = "theme", value_parser = parse_theme_entry)]
        theme: Vec<(String, PathBuf)>,
    },
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| format!("expected `primary` or `secondary`, got `{value}`"))
}

fn parse_theme_entry(value: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got `{value}`"))?;
    Ok((name.to_string(), PathBuf::from(path)))
}

impl Cli {
    fn site_config(&self) -> CliResult<SiteConfig> {
        let mut config = SiteConfig::from_env()?;
        if let Some(locale) = &self.first_locale {
            config.first_locale = locale.clone();
        }
        if let Some(language) = &self.second_lang {
            config.second_language = language.clone();
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.as_str());
        }
        Ok(config)
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.log_dir {
        let dir = std::env::current_dir()?.join(dir);
        init_logging(&cli.log_level, &dir.to_string_lossy())?;
    }

    if let Command::Ping = cli.command {
        for line in ping_report() {
            println!("{line}");
        }
        return Ok(());
    }

    let config = cli.site_config()?;
    let conn = open_db(&cli.db)?;
    let site = BilingualSite::new(config, SqliteContentStore::try_new(&conn)?);
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );
    run(&site, cli.command)
}

fn run(site: &BilingualSite<SqliteContentStore<'_>>, command: Command) -> CliResult<()> {
    let store = site.links().store();
    match command {
        Command::Ping => {}
        Command::Category => {
            println!("{}", serde_json::to_string_pretty(&site.secondary_category())?);
        }
        Command::Add {
            category,
            title,
            slug,
        } => {
            let id = store.create_record(&ContentRecord::new(category, title, slug))?;
            println!("{id}");
        }
        Command::List { category } => {
            let records = store.list_records(category)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Link { id, to } => {
            let change = site.links().set_link(id, to)?;
            for unlinked in &change.unlinked {
                println!("unlinked {unlinked}");
            }
            match change.current {
                Some(partner) => println!("{id} <-> {partner}"),
                None => println!("{id} has no translation"),
            }
        }
        Command::Panel { id } => match site.translation_panel(id, &SessionNonces::new())? {
            Some(panel) => print!("{}", panel.to_html()),
            None => return Err(format!("record {id} not found").into()),
        },
        Command::Head { id } => {
            let view = PageView::Record(id);
            println!("{}", site.language_attribute(view, ""));
            print!("{}", site.head_markup(view));
        }
        Command::TemplateSet { id, template } => {
            store.set_meta(id, PAGE_TEMPLATE_META_KEY, &template)?;
        }
        Command::Template { id, host, theme } => {
            let table = theme
                .into_iter()
                .fold(TemplateTable::new(), |table, (name, path)| table.with(name, path));
            let path = site.template_for(PageView::Record(id), host, &table);
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn ping_report() -> Vec<String> {
    let logging = match logging_status() {
        Some((level, dir)) => format!("{level} dir={}", dir.display()),
        None => "off".to_string(),
    };
    vec![
        format!("bilingual_core ping={}", ping()),
        format!("bilingual_core version={}", core_version()),
        format!("logging={logging}"),
    ]
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Ping => "ping",
        Command::Category => "category",
        Command::Add { .. } => "add",
        Command::List { .. } => "list",
        Command::Link { .. } => "link",
        Command::Panel { .. } => "panel",
        Command::Head { .. } => "head",
        Command::TemplateSet { .. } => "template_set",
        Command::Template { .. } => "template",
    }
}
