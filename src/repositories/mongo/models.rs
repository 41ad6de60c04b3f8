#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoUserModel {
    pub id: String,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoPostModel {
    pub id: String,
    pub creator: String,
    pub caption: String,
    pub image: MongoPostImageModel,
    pub location: String,
    pub tags: Vec<String>,
    pub likers: Vec<String>,
    pub likers_size: i64,
    pub created: String,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoPostImageModel {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoSaveModel {
    pub id: String,
    pub user: String,
    pub post: String,
    pub created: String,
}
