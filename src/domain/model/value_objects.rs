use crate::domain::error::DomainError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// UUIDをラップした識別子型を定義する
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// 新しい一意の識別子を生成
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// UUIDから識別子を作成
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// 文字列から識別子を作成
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                let uuid = Uuid::parse_str(s)?;
                Ok(Self(uuid))
            }

            /// 内部のUUIDを取得
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

uuid_identifier!(
    /// 予約の一意識別子
    BookingId
);
uuid_identifier!(
    /// 客室の一意識別子
    RoomId
);
uuid_identifier!(
    /// ホテルの一意識別子
    HotelId
);
uuid_identifier!(
    /// 利用者の一意識別子（認証済みの呼び出し元）
    UserId
);

/// 金額を表す値オブジェクト
/// 小数2桁の十進数で保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// 金額を作成（負の値は不可）
    pub fn new(amount: Decimal) -> Result<Self, DomainError> {
        if amount.is_sign_negative() {
            return Err(DomainError::InvalidValue(format!(
                "金額は0以上である必要があります: {}",
                amount
            )));
        }
        let mut amount = amount.round_dp(2);
        amount.rescale(2);
        Ok(Self(amount))
    }

    /// 0円
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// 金額を取得
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// 金額が正の値か
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// 金額を乗算
    ///
    /// # Returns
    /// * `Err(DomainError::InvalidValue)` - 計算結果が表現できる範囲を超えた
    pub fn multiply(&self, factor: u32) -> Result<Self, DomainError> {
        self.0
            .checked_mul(Decimal::from(factor))
            .map(Self)
            .ok_or_else(|| {
                DomainError::InvalidValue(format!("金額の計算が桁あふれしました: {} × {}", self, factor))
            })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// 宿泊期間を表す値オブジェクト
/// チェックアウト日はチェックイン日より後でなければならない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayPeriod {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayPeriod {
    /// 宿泊期間を作成
    ///
    /// # Returns
    /// * `Err(DomainError::InvalidStayPeriod)` - チェックアウト日がチェックイン日以前
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::InvalidStayPeriod(
                "Check-out date must be after check-in.".to_string(),
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// チェックイン日
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// チェックアウト日
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// 宿泊数
    pub fn nights(&self) -> u32 {
        // check_out > check_in が保証されているため常に正
        (self.check_out - self.check_in).num_days() as u32
    }
}

/// 客室タイプ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Single,
    Double,
    Large,
    Vip,
}

impl RoomType {
    /// 文字列から客室タイプを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Single" => Ok(RoomType::Single),
            "Double" => Ok(RoomType::Double),
            "Large" => Ok(RoomType::Large),
            "Vip" => Ok(RoomType::Vip),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な客室タイプ: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomType::Single => "Single",
            RoomType::Double => "Double",
            RoomType::Large => "Large",
            RoomType::Vip => "Vip",
        };
        write!(f, "{}", s)
    }
}

/// 予約ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// 確認待ち（在庫はまだ減算されていない）
    Pending,
    /// 確定済み（在庫を1つ確保済み）
    Confirmed,
    /// キャンセル済み（終端状態）
    Cancelled,
}

impl BookingStatus {
    /// 文字列から予約ステータスを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }

    /// 文字列表現（永続化・JSONで使用）
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
