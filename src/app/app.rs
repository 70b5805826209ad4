use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::app_conf::AppConfig;
use crate::config::{OutputConfig, SmtpConfig};
use crate::router::quote_router::quote_router;
use crate::service::quote_service::QuoteServiceImpl;
use crate::util::email::SmtpEmailService;
use crate::util::pdf::PdfRenderer;

pub struct App {
    config: AppConfig,
    router: Router,
    pub quote_service: Arc<QuoteServiceImpl>,
}

impl App {
    pub fn new() -> Self {
        let config = AppConfig::from_env();
        let smtp_config = SmtpConfig::from_env();
        let output_config = OutputConfig::from_env();

        // SMTP credentials are validated at first send, not here: the
        // inline-PDF endpoint must work without any mail configuration.
        let email_service =
            Arc::new(SmtpEmailService::new(smtp_config).expect("SMTP service error"));
        let quote_service = Arc::new(QuoteServiceImpl::new(
            PdfRenderer::new(),
            email_service,
            output_config,
        ));

        let router = quote_router(quote_service.clone());
        App {
            config,
            router,
            quote_service,
        }
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(self.config.host.parse().expect("Invalid host"), self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }
}

impl Default for App {
    fn default() -> Self {
        App::new()
    }
}
