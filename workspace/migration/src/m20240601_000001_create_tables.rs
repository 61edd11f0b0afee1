use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create department table
        manager
            .create_table(
                Table::create()
                    .table(Department::Table)
                    .if_not_exists()
                    .col(pk_auto(Department::DepartmentId))
                    .col(string(Department::DepartmentName).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create course table
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(pk_auto(Course::CourseId))
                    .col(string(Course::CourseName))
                    .col(integer_null(Course::DepartmentId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_department")
                            .from(Course::Table, Course::DepartmentId)
                            .to(Department::Table, Department::DepartmentId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create role table
        manager
            .create_table(
                Table::create()
                    .table(Role::Table)
                    .if_not_exists()
                    .col(pk_auto(Role::RoleId))
                    .col(string(Role::RoleName).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create user table
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(string(User::UserId).primary_key())
                    .col(string(User::UserFirstName))
                    .col(string(User::UserLastName))
                    .col(string(User::PasswordHash))
                    .col(integer_null(User::RoleId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_role")
                            .from(User::Table, User::RoleId)
                            .to(Role::Table, Role::RoleId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create status table
        manager
            .create_table(
                Table::create()
                    .table(Status::Table)
                    .if_not_exists()
                    .col(integer(Status::StatusId).primary_key())
                    .col(string(Status::StatusName))
                    .to_owned(),
            )
            .await?;

        // Create year table
        manager
            .create_table(
                Table::create()
                    .table(Year::Table)
                    .if_not_exists()
                    .col(pk_auto(Year::YearId))
                    .col(string(Year::YearName).unique_key())
                    .col(boolean(Year::IsActive).default(false))
                    .to_owned(),
            )
            .await?;

        // Create semester table
        manager
            .create_table(
                Table::create()
                    .table(Semester::Table)
                    .if_not_exists()
                    .col(pk_auto(Semester::SemesterId))
                    .col(string(Semester::SemesterName))
                    .col(integer(Semester::YearId))
                    .col(boolean(Semester::IsActive).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_semester_year")
                            .from(Semester::Table, Semester::YearId)
                            .to(Year::Table, Year::YearId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_semester_year_name")
                    .table(Semester::Table)
                    .col(Semester::YearId)
                    .col(Semester::SemesterName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create fees table
        manager
            .create_table(
                Table::create()
                    .table(Fees::Table)
                    .if_not_exists()
                    .col(pk_auto(Fees::FeeId))
                    .col(integer(Fees::SemesterId))
                    .col(string(Fees::FeeName))
                    .col(decimal(Fees::FeeAmount).decimal_len(10, 2))
                    .col(string_len(Fees::Role, 1).default("0"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fees_semester")
                            .from(Fees::Table, Fees::SemesterId)
                            .to(Semester::Table, Semester::SemesterId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create history_fee table (no foreign key back to fees: rows outlive the fee)
        manager
            .create_table(
                Table::create()
                    .table(HistoryFee::Table)
                    .if_not_exists()
                    .col(pk_auto(HistoryFee::HistoryId))
                    .col(integer(HistoryFee::FeeId))
                    .col(integer(HistoryFee::SemesterId))
                    .col(string(HistoryFee::FeeName))
                    .col(decimal(HistoryFee::FeeAmount).decimal_len(10, 2))
                    .col(string_len(HistoryFee::Role, 1))
                    .col(date_time(HistoryFee::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create student identity table
        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(string(Student::StudentId).primary_key())
                    .col(string(Student::StudentFirstname))
                    .col(string(Student::StudentLastname))
                    .col(date_time(Student::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create student_enrollment table (one row per student per semester)
        manager
            .create_table(
                Table::create()
                    .table(StudentEnrollment::Table)
                    .if_not_exists()
                    .col(string(StudentEnrollment::StudentId))
                    .col(integer(StudentEnrollment::SemesterId))
                    .col(integer_null(StudentEnrollment::DepartmentId))
                    .col(integer_null(StudentEnrollment::CourseId))
                    .col(integer(StudentEnrollment::StatusId).default(1))
                    .col(boolean(StudentEnrollment::IsOfficer).default(false))
                    .col(boolean(StudentEnrollment::IsRemoved).default(false))
                    .col(date_time(StudentEnrollment::CreatedAt))
                    .primary_key(
                        Index::create()
                            .name("pk_student_enrollment")
                            .col(StudentEnrollment::StudentId)
                            .col(StudentEnrollment::SemesterId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_enrollment_student")
                            .from(StudentEnrollment::Table, StudentEnrollment::StudentId)
                            .to(Student::Table, Student::StudentId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_enrollment_semester")
                            .from(StudentEnrollment::Table, StudentEnrollment::SemesterId)
                            .to(Semester::Table, Semester::SemesterId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_enrollment_department")
                            .from(StudentEnrollment::Table, StudentEnrollment::DepartmentId)
                            .to(Department::Table, Department::DepartmentId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_enrollment_course")
                            .from(StudentEnrollment::Table, StudentEnrollment::CourseId)
                            .to(Course::Table, Course::CourseId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_enrollment_status")
                            .from(StudentEnrollment::Table, StudentEnrollment::StatusId)
                            .to(Status::Table, Status::StatusId)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create payment table; fee_id is a plain lookup key so deleted fees keep their payments
        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(pk_auto(Payment::PaymentId))
                    .col(string(Payment::StudentId))
                    .col(integer(Payment::SemesterId))
                    .col(integer(Payment::FeeId))
                    .col(decimal(Payment::AmountPaid).decimal_len(10, 2))
                    .col(date_time(Payment::PaymentDate))
                    .col(string(Payment::ControlNumber))
                    .col(string(Payment::IssuedBy))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_student")
                            .from(Payment::Table, Payment::StudentId)
                            .to(Student::Table, Student::StudentId)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_semester")
                            .from(Payment::Table, Payment::SemesterId)
                            .to(Semester::Table, Semester::SemesterId)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one payment per student, semester and fee
        manager
            .create_index(
                Index::create()
                    .name("ux_payment_student_semester_fee")
                    .table(Payment::Table)
                    .col(Payment::StudentId)
                    .col(Payment::SemesterId)
                    .col(Payment::FeeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_payment_control_number")
                    .table(Payment::Table)
                    .col(Payment::ControlNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_payment_payment_date")
                    .table(Payment::Table)
                    .col(Payment::PaymentDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentEnrollment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Student::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HistoryFee::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Fees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Semester::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Year::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Status::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Role::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Department::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Department {
    Table,
    DepartmentId,
    DepartmentName,
}

#[derive(DeriveIden)]
enum Course {
    Table,
    CourseId,
    CourseName,
    DepartmentId,
}

#[derive(DeriveIden)]
enum Role {
    Table,
    RoleId,
    RoleName,
}

#[derive(DeriveIden)]
enum User {
    Table,
    UserId,
    UserFirstName,
    UserLastName,
    PasswordHash,
    RoleId,
}

#[derive(DeriveIden)]
enum Status {
    Table,
    StatusId,
    StatusName,
}

#[derive(DeriveIden)]
enum Year {
    Table,
    YearId,
    YearName,
    IsActive,
}

#[derive(DeriveIden)]
enum Semester {
    Table,
    SemesterId,
    SemesterName,
    YearId,
    IsActive,
}

#[derive(DeriveIden)]
enum Fees {
    Table,
    FeeId,
    SemesterId,
    FeeName,
    FeeAmount,
    Role,
}

#[derive(DeriveIden)]
enum HistoryFee {
    Table,
    HistoryId,
    FeeId,
    SemesterId,
    FeeName,
    FeeAmount,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Student {
    Table,
    StudentId,
    StudentFirstname,
    StudentLastname,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StudentEnrollment {
    Table,
    StudentId,
    SemesterId,
    DepartmentId,
    CourseId,
    StatusId,
    IsOfficer,
    IsRemoved,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Payment {
    Table,
    PaymentId,
    StudentId,
    SemesterId,
    FeeId,
    AmountPaid,
    PaymentDate,
    ControlNumber,
    IssuedBy,
}
