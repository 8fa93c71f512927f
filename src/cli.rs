//! Subcommand implementations for the terminal client.
use anyhow::{Context as _, Result};
use manset::api::{ApiClient, CommentSource, NewsQuery, NewsSource};
use manset::config::Config;
use manset::controller::{
    Debouncer, ListStatus, OptimisticThread, PageSource, Paginator, SubmitError, SubmitOutcome,
    ThreadEntry,
};
use manset::model::{Comment, NewsArticle};
use manset::store::Store;
use manset::util::{fit_width, one_line};
use tokio::io::AsyncBufReadExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Everything a subcommand needs, built once in `main`.
pub struct Context {
    pub client: ApiClient,
    pub config: Config,
    pub store: Store,
    pub width: usize,
}

impl Context {
    fn news_paginator(&self) -> Paginator<NewsSource> {
        Paginator::new(NewsSource::new(self.client.clone()), self.config.page_size)
            .with_retry_attempts(self.config.retry_attempts)
            .with_store(self.store.clone())
    }

    fn comment_source(&self, news_id: &str) -> CommentSource {
        CommentSource::new(self.client.clone(), news_id)
            .with_display_name(self.config.display_name.clone())
    }

    /// Load up to `pages` pages of an article's comments into a thread.
    async fn load_thread(
        &self,
        news_id: &str,
        pages: u32,
    ) -> Result<OptimisticThread<CommentSource>> {
        let paginator = Paginator::new(self.comment_source(news_id), self.config.page_size)
            .with_retry_attempts(self.config.retry_attempts)
            .with_store(self.store.clone());
        load_pages(&paginator, pages)
            .await
            .context("Yorumlar yüklenemedi")?;

        let thread = OptimisticThread::new(self.comment_source(news_id))
            .with_rules(self.config.comment_rules())
            .with_store(self.store.clone());
        thread.replace_all(paginator.items());
        Ok(thread)
    }
}

/// Print error notices to stderr until the last `Store` handle is dropped.
pub fn spawn_notice_printer(store: &Store) -> JoinHandle<()> {
    let mut rx = store.subscribe_notices();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notice) => eprintln!("{}", notice),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notice printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Call `load_next` until `pages` pages are in or the list is exhausted.
async fn load_pages<S: PageSource>(paginator: &Paginator<S>, pages: u32) -> Result<(), S::Error> {
    for _ in 0..pages.max(1) {
        if !paginator.has_more() {
            break;
        }
        paginator.load_next().await?;
    }
    Ok(())
}

pub async fn news(
    ctx: &Context,
    category: Option<String>,
    search: Option<String>,
    pages: u32,
) -> Result<()> {
    let paginator = ctx.news_paginator();
    paginator.reset(NewsQuery { category, search });

    let loaded = load_pages(&paginator, pages).await;
    paginator.with_items(|items| print_news(items, ctx.width));
    print_footer(&paginator.status());
    loaded.context("Haberler yüklenemedi")
}

pub async fn comments(ctx: &Context, news_id: &str, pages: u32) -> Result<()> {
    let thread = ctx.load_thread(news_id, pages).await?;
    if thread.is_empty() {
        println!("Henüz yorum yapılmamış.");
    }
    thread.with_entries(|entries| print_thread(entries, 0, ctx.width));
    Ok(())
}

pub async fn comment(
    ctx: &Context,
    news_id: &str,
    text: &str,
    reply_to: Option<&str>,
) -> Result<()> {
    let thread = ctx.load_thread(news_id, 1).await?;

    match thread.submit(text, reply_to).await {
        Ok(SubmitOutcome::Confirmed(id)) => {
            println!("Yorumunuz yayınlandı ({}).", id);
            Ok(())
        }
        Ok(SubmitOutcome::Unconfirmed(_)) => {
            println!("Yorumunuz alındı, onay bekliyor.");
            Ok(())
        }
        Ok(SubmitOutcome::Discarded) => Ok(()),
        Err(SubmitError::Validation(e)) => {
            eprintln!("{}", e);
            anyhow::bail!("Yorum geçersiz")
        }
        Err(e) => {
            // The notice printer shows the toast; give the text back for editing
            if let Some(text) = e.text() {
                eprintln!("Metniniz: {}", text);
            }
            Err(anyhow::Error::new(e))
        }
    }
}

/// Search-as-you-type over stdin. Each line replaces the query; only the
/// last line of a burst is sent, after the configured quiet period.
pub async fn search(ctx: &Context, category: Option<String>) -> Result<()> {
    let paginator = ctx.news_paginator();
    let (query_tx, mut query_rx) = mpsc::unbounded_channel::<String>();
    let debouncer = Debouncer::new(ctx.config.search_debounce(), move |query: String| {
        let _ = query_tx.send(query);
    });

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut eof = false;

    loop {
        tokio::select! {
            line = lines.next_line(), if !eof => {
                match line.context("Failed to read stdin")? {
                    Some(line) => debouncer.call(line),
                    None => {
                        eof = true;
                        if !debouncer.is_pending() {
                            // The last burst may already have fired
                            while let Ok(query) = query_rx.try_recv() {
                                run_search(ctx, &paginator, category.clone(), query).await;
                            }
                            break;
                        }
                    }
                }
            }
            Some(query) = query_rx.recv() => {
                run_search(ctx, &paginator, category.clone(), query).await;
                if eof {
                    break;
                }
            }
        }
    }
    Ok(())
}

async fn run_search(
    ctx: &Context,
    paginator: &Paginator<NewsSource>,
    category: Option<String>,
    query: String,
) {
    let query = query.trim().to_string();
    paginator.reset(NewsQuery {
        category,
        search: (!query.is_empty()).then(|| query.clone()),
    });

    println!("── \"{}\" ──", one_line(&query));
    if let Err(e) = paginator.load_next().await {
        tracing::warn!(query = %query, error = %e, "Search failed");
    }
    paginator.with_items(|items| print_news(items, ctx.width));
    print_footer(&paginator.status());
}

fn print_news(items: &[NewsArticle], width: usize) {
    for article in items {
        let date = article.published_at.format("%d.%m.%Y %H:%M");
        let category = article
            .category
            .as_ref()
            .map(|c| format!(" [{}]", c.name))
            .unwrap_or_default();
        let head = format!("{}{} ", date, category);
        let room = width.saturating_sub(head.chars().count());
        println!("{}{}", head, fit_width(&one_line(&article.title), room));
    }
}

fn print_thread(entries: &[ThreadEntry<Comment>], depth: usize, width: usize) {
    for entry in entries {
        let indent = "  ".repeat(depth);
        let author = entry
            .item
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or("Anonim");
        let marker = if entry.is_pending() { " (gönderiliyor)" } else { "" };
        let head = format!("{}{}{}: ", indent, one_line(author), marker);
        let room = width.saturating_sub(head.chars().count());
        println!("{}{}", head, fit_width(&one_line(&entry.item.text), room));
        print_thread(&entry.replies, depth + 1, width);
    }
}

fn print_footer(status: &ListStatus) {
    match status {
        ListStatus::Exhausted => println!("Başka haber yok."),
        ListStatus::Failed(message) => eprintln!("Yüklenemedi: {}", message),
        ListStatus::Idle | ListStatus::Loading => {}
    }
}
