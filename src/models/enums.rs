use serde::{Deserialize, Serialize};

use super::ModelError;

/// Enums chosen by key from a command line.
pub trait Keyed: Sized + Copy + 'static {
    fn all() -> &'static [Self];
    fn key(&self) -> &'static str;

    /// Every key, comma separated.
    fn keys() -> String {
        Self::all()
            .iter()
            .map(Keyed::key)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Macro to generate enum with as_str + label + std::str::FromStr pattern.
///
/// `as_str` is the wire/storage key, `label` the Thai text shown on
/// screen and matched by the search box.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal, $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl Keyed for $name {
            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn key(&self) -> &'static str {
                self.as_str()
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            /// Accepts either the key or the on-screen label.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($s | $label => Ok(Self::$variant)),+,
                    other => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: other.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

str_enum!(Role {
    Doctor => "doctor", "แพทย์",
    Staff => "staff", "พนักงาน",
    Owner => "owner", "เจ้าของ",
});

str_enum!(LabTestType {
    Blood => "blood", "ตรวจเลือด",
    Urine => "urine", "ตรวจปัสสาวะ",
    XRay => "x_ray", "X-Ray",
    Other => "other", "อื่นๆ",
});

str_enum!(CertificateType {
    General => "general", "ใบรับรองแพทย์ทั่วไป",
    SickLeave => "sick_leave", "ใบรับรองการลาป่วย",
    Fitness => "fitness", "ใบรับรองสุขภาพ",
});

str_enum!(AppointmentType {
    General => "general", "ตรวจรักษาทั่วไป",
    AnnualCheckup => "annual_checkup", "ตรวจสุขภาพประจำปี",
    FollowUp => "follow_up", "ตรวจติดตามผล",
});

// Front-desk visit state of a locally booked appointment.
str_enum!(VisitStatus {
    Waiting => "waiting", "รอพบแพทย์",
    Confirmed => "confirmed", "ยืนยันแล้ว",
});

// Appointment state as stored by the backend.
str_enum!(AppointmentStatus {
    Scheduled => "scheduled", "นัดแล้ว",
    Completed => "completed", "ตรวจแล้ว",
    Cancelled => "cancelled", "ยกเลิก",
    NoShow => "no_show", "ไม่มาตามนัด",
    Rescheduled => "rescheduled", "เลื่อนนัด",
});

str_enum!(ServiceType {
    General => "general", "ตรวจรักษาทั่วไป",
    BloodTest => "blood_test", "ตรวจเลือด",
    Swab => "swab", "ตรวจสารคัดหลั่ง",
    Certificate => "certificate", "ใบรับรองแพทย์",
});

str_enum!(PaymentMethod {
    Cash => "cash", "เงินสด",
    Credit => "credit", "บัตรเครดิต",
    Transfer => "transfer", "โอนเงิน",
    QrCode => "qr_code", "QR Code",
});

impl PaymentMethod {
    /// Methods the backend accepts when settling a payment.
    pub fn accepted_by_server(&self) -> bool {
        !matches!(self, Self::QrCode)
    }
}

str_enum!(ReferralStatus {
    Pending => "pending", "รอติดตาม",
    Completed => "completed", "ติดตามแล้ว",
});

// Dashboard tabs. Switching tab clears the search box.
str_enum!(DoctorTab {
    Records => "records", "เวชระเบียน",
    Treatment => "treatment", "บันทึกการรักษา",
    Certificate => "certificate", "ใบรับรอง",
    Lab => "lab", "ผลแล็บ",
    Referral => "referral", "ส่งตัว",
});

str_enum!(StaffTab {
    Patients => "patients", "ทะเบียนผู้ป่วย",
    Appointments => "appointments", "การนัดหมาย",
    Payment => "payment", "ชำระเงิน",
});

str_enum!(OwnerTab {
    Staff => "staff", "ทะเบียนพนักงาน",
    Revenue => "revenue", "รายได้",
});
