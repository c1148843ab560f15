use tonic::{Request, Response, Status};
use uuid::Uuid;

use yata_proto::auth::{
    CheckVerifyRequest, CheckVerifyResponse, ForgotPasswordRequest, ForgotPasswordResponse,
    GetUserRequest, GetUserResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest, ResetPasswordResponse, VerifyPasswordRequest,
    VerifyPasswordResponse, VerifyRequest, VerifyResponse, auth_server::Auth as AuthRpc,
};

use crate::state::AppState;
use crate::usecase::auth::{Auth, LoginInput, RegisterInput, ResetPasswordInput};

#[derive(Clone)]
pub struct AuthGrpcServer {
    pub state: AppState,
}

fn parse_user_id(raw: &str) -> Result<Uuid, Status> {
    raw.parse::<Uuid>()
        .map_err(|_| Status::invalid_argument("invalid user_id"))
}

#[tonic::async_trait]
impl AuthRpc for AuthGrpcServer {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();
        let user_id = self
            .state
            .auth_service()
            .register(RegisterInput {
                username: req.username,
                email: req.email,
                password: req.password,
            })
            .await?;

        Ok(Response::new(RegisterResponse {
            user_id: user_id.to_string(),
        }))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();
        let token = self
            .state
            .auth_service()
            .login(LoginInput {
                email: req.email,
                password: req.password,
            })
            .await?;

        Ok(Response::new(LoginResponse { token }))
    }

    async fn verify_user(
        &self,
        request: Request<VerifyRequest>,
    ) -> Result<Response<VerifyResponse>, Status> {
        let user_id = parse_user_id(&request.into_inner().user_id)?;
        self.state
            .auth_service()
            .request_verification(user_id)
            .await?;
        Ok(Response::new(VerifyResponse {}))
    }

    async fn check_verify(
        &self,
        request: Request<CheckVerifyRequest>,
    ) -> Result<Response<CheckVerifyResponse>, Status> {
        let code = request.into_inner().code;
        self.state
            .auth_service()
            .confirm_verification(&code)
            .await?;
        Ok(Response::new(CheckVerifyResponse {}))
    }

    async fn forgot_password(
        &self,
        request: Request<ForgotPasswordRequest>,
    ) -> Result<Response<ForgotPasswordResponse>, Status> {
        let user_id = parse_user_id(&request.into_inner().user_id)?;
        self.state.auth_service().forgot_password(user_id).await?;
        Ok(Response::new(ForgotPasswordResponse {}))
    }

    async fn verify_password(
        &self,
        request: Request<VerifyPasswordRequest>,
    ) -> Result<Response<VerifyPasswordResponse>, Status> {
        let code = request.into_inner().code;
        self.state.auth_service().verify_reset_code(&code).await?;
        Ok(Response::new(VerifyPasswordResponse {}))
    }

    async fn reset_password(
        &self,
        request: Request<ResetPasswordRequest>,
    ) -> Result<Response<ResetPasswordResponse>, Status> {
        let req = request.into_inner();
        let user_id = parse_user_id(&req.user_id)?;
        self.state
            .auth_service()
            .reset_password(ResetPasswordInput {
                user_id,
                password: req.password,
                password_confirm: req.password_re,
                code: req.code,
            })
            .await?;
        Ok(Response::new(ResetPasswordResponse {}))
    }

    async fn get_user_by_id(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        let user_id = parse_user_id(&request.into_inner().user_id)?;
        let user = self.state.auth_service().get_profile(user_id).await?;

        Ok(Response::new(GetUserResponse {
            user_id: user.id.to_string(),
            username: user.username,
            email: user.email,
            is_verified: user.is_verified,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }))
    }
}
