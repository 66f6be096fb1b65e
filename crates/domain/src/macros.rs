/// データベース採番（BIGSERIAL）の整数 ID 型を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`i64` をラップ）
/// - `derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)`
/// - `from_i64()`: データベースから取得した値で復元
/// - `as_i64()`: 内部の整数値を取得
///
/// ID の生成はデータベースの責務のため、`new()` / `Default` は生成しない。
///
/// # 使用例
///
/// ```rust
/// use scribe_domain::user::UserId;
///
/// let id = UserId::from_i64(42);
/// assert_eq!(id.as_i64(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
macro_rules! define_serial_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        $vis struct $Name(i64);

        impl $Name {
            /// データベースが採番した値から ID を作成する
            pub fn from_i64(value: i64) -> Self {
                Self(value)
            }

            /// 内部の整数値を取得する
            pub fn as_i64(self) -> i64 {
                self.0
            }
        }
    };
}
