use super::UserRole;

#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub username: String,
    pub email: String,
    pub role: UserRole,
    /// Required for Owner and Staff, absent for platform admins
    pub business_id: Option<String>,
    pub password: String,
}
