use sqlx::FromRow;
use time::OffsetDateTime;

/// ステータス未指定で作成されたユーザーに付与される値
pub const DEFAULT_STATUS: &str = "active";

/// users テーブルの 1 行
///
/// 出力は必ず `views` を経由する（`password` は外に出さない）。
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct User {
    /// ストアが採番する。未保存なら 0
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// 未設定なら insert 時に現在時刻が入る
    pub date_created: Option<OffsetDateTime>,
    pub status: String,
    /// argon2id の PHC 文字列
    pub password: Option<String>,
}

impl User {
    /// 部分更新: 空でない項目だけを `self` に上書きする
    pub fn overlay(&mut self, patch: User) {
        if !patch.first_name.trim().is_empty() {
            self.first_name = patch.first_name;
        }
        if !patch.last_name.trim().is_empty() {
            self.last_name = patch.last_name;
        }
        if !patch.email.trim().is_empty() {
            self.email = patch.email;
        }
    }
}
