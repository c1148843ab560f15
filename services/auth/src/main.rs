use sea_orm::Database;
use tracing::info;

use yata_core::config::Config;
use yata_core::tracing::init_tracing;
use yata_proto::auth::auth_server::AuthServer;

use yata_auth::config::AuthConfig;
use yata_auth::grpc_server::AuthGrpcServer;
use yata_auth::infra::amqp::AmqpEmailPublisher;
use yata_auth::router::build_router;
use yata_auth::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let publisher = AmqpEmailPublisher::connect(&config.amqp_url, config.broker_settings())
        .await
        .expect("failed to connect to AMQP broker");

    let state = AppState {
        db,
        redis,
        publisher,
        tokens: config.token_service(),
        hasher: config.password_hasher(),
        settings: config.auth_settings(),
    };

    // Spawn gRPC server
    let grpc_addr = format!("0.0.0.0:{}", config.grpc_port);
    let request_timeout = config.request_timeout();
    let grpc_state = state.clone();
    tokio::spawn(async move {
        info!("auth gRPC server listening on {grpc_addr}");
        tonic::transport::Server::builder()
            .timeout(request_timeout)
            .add_service(AuthServer::new(AuthGrpcServer { state: grpc_state }))
            .serve(grpc_addr.parse().expect("invalid gRPC address"))
            .await
            .expect("gRPC server error");
    });

    // HTTP probes
    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("auth health endpoints listening on {http_addr}");
    axum::serve(listener, build_router(state))
        .await
        .expect("server error");
}
