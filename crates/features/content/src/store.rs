use crate::error::{ContentError, ContentErrorExt};
use crate::models::{NewsPayload, NewsRow};
use atelier_database::{Database, QueryBuilder};
use atelier_kernel::safe_nanoid;

pub(crate) const NEWS_PER_PAGE: u64 = 12;

const NEWS_FIELDS: &str = "record::id(id) AS id, record::id(author) AS author, title, body, \
     main_picture, attachments, show_at_home, show_at_news, time::unix(created_at) AS created_at";

/// News persistence.
#[derive(Debug, Clone)]
pub struct NewsStore {
    db: Database,
}

impl NewsStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        author_user_id: &str,
        payload: &NewsPayload,
    ) -> Result<String, ContentError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "CREATE type::thing('news', $id) SET author = type::thing('user', $author), \
                 title = $title, body = $body, main_picture = $picture, \
                 attachments = $attachments, show_at_home = $home, show_at_news = $news;",
            )
            .bind(("id", id.clone()))
            .bind(("author", author_user_id.to_owned()))
            .bind(("title", payload.title.clone()))
            .bind(("body", payload.body.clone()))
            .bind(("picture", payload.main_picture.clone()))
            .bind(("attachments", payload.attachments.clone()))
            .bind(("home", payload.show_at_home))
            .bind(("news", payload.show_at_news))
            .await
            .context("Creating news")?;
        Ok(id)
    }

    pub async fn update(
        &self,
        news_id: &str,
        author_user_id: &str,
        payload: &NewsPayload,
    ) -> Result<(), ContentError> {
        self.db
            .query(
                "UPDATE type::thing('news', $id) SET author = type::thing('user', $author), \
                 title = $title, body = $body, main_picture = $picture, \
                 attachments = $attachments, show_at_home = $home, show_at_news = $news, \
                 updated_at = time::now();",
            )
            .bind(("id", news_id.to_owned()))
            .bind(("author", author_user_id.to_owned()))
            .bind(("title", payload.title.clone()))
            .bind(("body", payload.body.clone()))
            .bind(("picture", payload.main_picture.clone()))
            .bind(("attachments", payload.attachments.clone()))
            .bind(("home", payload.show_at_home))
            .bind(("news", payload.show_at_news))
            .await
            .context("Updating news")?;
        Ok(())
    }

    pub async fn delete(&self, news_id: &str) -> Result<(), ContentError> {
        self.db
            .query("DELETE type::thing('news', $id);")
            .bind(("id", news_id.to_owned()))
            .await
            .context("Deleting news")?;
        Ok(())
    }

    pub async fn find(&self, news_id: &str) -> Result<Option<NewsRow>, ContentError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {NEWS_FIELDS} FROM news WHERE id = type::thing('news', $id) LIMIT 1;"
            ))
            .bind(("id", news_id.to_owned()))
            .await
            .context("Loading news")?
            .take::<Vec<NewsRow>>(0)
            .context("Parsing news")?;
        Ok(rows.into_iter().next())
    }

    /// Public listing: home-page posts or news-page posts, newest first.
    pub async fn list_public(
        &self,
        for_home: bool,
        page: u64,
    ) -> Result<(u64, Vec<NewsRow>), ContentError> {
        let mut query = QueryBuilder::select("news");
        for field in NEWS_FIELDS.split(", ") {
            query = query.field(field);
        }
        query = if for_home {
            query.filter("show_at_home = true")
        } else {
            query.filter("show_at_news = true")
        };
        let query = query.order("created_at DESC").page(page.max(1), NEWS_PER_PAGE);

        let total = self.db.run_count(&query).await?;
        let rows =
            self.db.run(&query).await?.take::<Vec<NewsRow>>(0).context("Parsing news list")?;

        Ok((total.div_ceil(NEWS_PER_PAGE), rows))
    }
}
