//! Initial database migration.
//!
//! Creates the enums, tables, constraints and triggers of the ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNT DIRECTORY
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(CORRESPONDENCE_SQL).await?;

        // ============================================================
        // PART 3: PERIODS & JOURNAL
        // ============================================================
        db.execute_unprepared(FINANCIAL_PERIODS_SQL).await?;
        db.execute_unprepared(STANDARD_OPERATIONS_SQL).await?;
        db.execute_unprepared(JOURNAL_SQL).await?;

        // ============================================================
        // PART 4: CASH, EVENTS & DEBTS
        // ============================================================
        db.execute_unprepared(CASH_SQL).await?;
        db.execute_unprepared(DEBTS_SQL).await?;
        db.execute_unprepared(BUSINESS_EVENTS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'income', 'expense');
CREATE TYPE normal_side AS ENUM ('debit', 'credit');
CREATE TYPE entry_status AS ENUM ('draft', 'posted');
CREATE TYPE period_type AS ENUM ('month', 'quarter', 'year', 'custom');
CREATE TYPE event_kind AS ENUM ('deposit', 'withdrawal', 'expense', 'income', 'debt_payment');
CREATE TYPE debt_direction AS ENUM ('payable', 'receivable');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id              UUID PRIMARY KEY,
    code            VARCHAR(20) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    account_type    account_type NOT NULL,
    normal_side     normal_side NOT NULL,
    parent_id       UUID REFERENCES accounts(id),
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_account_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX idx_accounts_parent ON accounts(parent_id);

CREATE TABLE analytical_accounts (
    id                  UUID PRIMARY KEY,
    code                VARCHAR(20) NOT NULL UNIQUE,
    name                VARCHAR(255) NOT NULL,
    parent_account_id   UUID NOT NULL REFERENCES accounts(id),
    is_active           BOOLEAN NOT NULL DEFAULT TRUE,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_analytical_parent ON analytical_accounts(parent_account_id);
";

const CORRESPONDENCE_SQL: &str = r"
CREATE TABLE correspondence_pairs (
    id                  UUID PRIMARY KEY,
    debit_account_id    UUID NOT NULL REFERENCES accounts(id),
    credit_account_id   UUID NOT NULL REFERENCES accounts(id),
    is_valid            BOOLEAN NOT NULL DEFAULT TRUE,
    description         TEXT,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_correspondence_pair UNIQUE (debit_account_id, credit_account_id)
);
";

const FINANCIAL_PERIODS_SQL: &str = r"
CREATE TABLE financial_periods (
    id              UUID PRIMARY KEY,
    name            VARCHAR(100) NOT NULL,
    period_type     period_type NOT NULL,
    start_date      DATE NOT NULL,
    end_date        DATE NOT NULL,
    is_closed       BOOLEAN NOT NULL DEFAULT FALSE,
    closed_by       UUID,
    closed_at       TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_period_range CHECK (start_date <= end_date),
    CONSTRAINT chk_period_closed_at CHECK (NOT is_closed OR closed_at IS NOT NULL)
);

CREATE INDEX idx_periods_range ON financial_periods(start_date, end_date);
";

const JOURNAL_SQL: &str = r"
CREATE TABLE journal_entries (
    id              UUID PRIMARY KEY,
    entry_date      DATE NOT NULL,
    memo            TEXT NOT NULL DEFAULT '',
    status          entry_status NOT NULL DEFAULT 'draft',
    created_by      UUID,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    posted_at       TIMESTAMPTZ,
    standard_operation_id UUID REFERENCES standard_operations(id),

    CONSTRAINT chk_posted_at CHECK (status = 'draft' OR posted_at IS NOT NULL)
);

CREATE INDEX idx_entries_date ON journal_entries(entry_date);
CREATE INDEX idx_entries_status_date ON journal_entries(status, entry_date);

CREATE TABLE journal_lines (
    id                      UUID PRIMARY KEY,
    entry_id                UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_no                 INTEGER NOT NULL,
    account_id              UUID NOT NULL REFERENCES accounts(id),
    analytical_account_id   UUID REFERENCES analytical_accounts(id),
    description             TEXT,
    debit                   NUMERIC(19, 2) NOT NULL DEFAULT 0,
    credit                  NUMERIC(19, 2) NOT NULL DEFAULT 0,

    CONSTRAINT uq_line_no UNIQUE (entry_id, line_no),
    CONSTRAINT chk_line_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_line_one_side CHECK ((debit > 0) <> (credit > 0))
);

CREATE INDEX idx_lines_entry ON journal_lines(entry_id);
CREATE INDEX idx_lines_account ON journal_lines(account_id);
";

const STANDARD_OPERATIONS_SQL: &str = r"
CREATE TABLE standard_operations (
    id              UUID PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    category        VARCHAR(100) NOT NULL DEFAULT '',
    description     TEXT,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_by      UUID,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE standard_operation_lines (
    id                      UUID PRIMARY KEY,
    operation_id            UUID NOT NULL REFERENCES standard_operations(id) ON DELETE CASCADE,
    line_no                 INTEGER NOT NULL,
    account_id              UUID NOT NULL REFERENCES accounts(id),
    analytical_account_id   UUID REFERENCES analytical_accounts(id),
    description             TEXT,
    debit_percent           NUMERIC(7, 4) NOT NULL DEFAULT 0,
    credit_percent          NUMERIC(7, 4) NOT NULL DEFAULT 0,
    is_variable             BOOLEAN NOT NULL DEFAULT FALSE,

    CONSTRAINT uq_operation_line_no UNIQUE (operation_id, line_no),
    CONSTRAINT chk_percent_range CHECK (
        debit_percent BETWEEN 0 AND 100 AND credit_percent BETWEEN 0 AND 100
    )
);
";

const CASH_SQL: &str = r"
CREATE TABLE cash_accounts (
    id              INTEGER PRIMARY KEY,
    balance         NUMERIC(19, 2) NOT NULL DEFAULT 0,
    currency        VARCHAR(3) NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_cash_singleton CHECK (id = 1)
);

CREATE TABLE expense_categories (
    id              UUID PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    description     TEXT,
    parent_id       UUID REFERENCES expense_categories(id),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_category_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);
";

const DEBTS_SQL: &str = r"
CREATE TABLE debts (
    id                  UUID PRIMARY KEY,
    direction           debt_direction NOT NULL,
    counterparty        VARCHAR(255) NOT NULL,
    title               VARCHAR(255) NOT NULL,
    description         TEXT,
    original_amount     NUMERIC(19, 2) NOT NULL,
    amount_paid         NUMERIC(19, 2) NOT NULL DEFAULT 0,
    due_date            DATE,
    created_by          UUID,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_debt_original_positive CHECK (original_amount > 0),
    CONSTRAINT chk_debt_paid_non_negative CHECK (amount_paid >= 0)
);

CREATE INDEX idx_debts_direction ON debts(direction);
";

const BUSINESS_EVENTS_SQL: &str = r"
CREATE TABLE business_events (
    id              UUID PRIMARY KEY,
    kind            event_kind NOT NULL,
    amount          NUMERIC(19, 2) NOT NULL,
    cash_delta      NUMERIC(19, 2) NOT NULL,
    event_date      DATE NOT NULL,
    recorded_by     UUID,
    category_id     UUID REFERENCES expense_categories(id),
    income_type     VARCHAR(20),
    debt_id         UUID REFERENCES debts(id),
    metadata        JSONB NOT NULL DEFAULT '{}',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_event_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_event_delta_magnitude CHECK (ABS(cash_delta) = amount),
    CONSTRAINT chk_expense_category CHECK (kind <> 'expense' OR category_id IS NOT NULL),
    CONSTRAINT chk_income_type CHECK (kind <> 'income' OR income_type IS NOT NULL),
    CONSTRAINT chk_debt_payment_debt CHECK (kind <> 'debt_payment' OR debt_id IS NOT NULL)
);

CREATE INDEX idx_events_kind_date ON business_events(kind, event_date);

CREATE TABLE debt_payments (
    id              UUID PRIMARY KEY,
    debt_id         UUID NOT NULL REFERENCES debts(id),
    event_id        UUID NOT NULL UNIQUE REFERENCES business_events(id),
    amount          NUMERIC(19, 2) NOT NULL,
    payment_date    DATE NOT NULL,
    comment         TEXT NOT NULL DEFAULT '',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_payment_positive CHECK (amount > 0)
);

CREATE INDEX idx_debt_payments_debt ON debt_payments(debt_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_entry_balance
-- A posted entry has at least one line and debits equal credits
-- ============================================================
CREATE OR REPLACE FUNCTION check_entry_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(19, 2);
    total_credit NUMERIC(19, 2);
    line_count INTEGER;
BEGIN
    IF NEW.status = 'posted' THEN
        SELECT COALESCE(SUM(debit), 0), COALESCE(SUM(credit), 0), COUNT(*)
        INTO total_debit, total_credit, line_count
        FROM journal_lines
        WHERE entry_id = NEW.id;

        IF line_count = 0 THEN
            RAISE EXCEPTION 'Posted entry % has no lines', NEW.id;
        END IF;

        IF total_debit <> total_credit THEN
            RAISE EXCEPTION 'Entry is not balanced. Debit: %, Credit: %',
                total_debit, total_credit;
        END IF;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_entry_balance
AFTER INSERT OR UPDATE ON journal_entries
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_entry_balance();

-- ============================================================
-- FUNCTION: prevent_posted_entry_change
-- Posted entries and their lines are immutable
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_entry_change()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'posted' THEN
        RAISE EXCEPTION 'Cannot modify posted journal entry %', OLD.id;
    END IF;
    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_entry_change
BEFORE UPDATE OR DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_entry_change();

CREATE OR REPLACE FUNCTION prevent_posted_line_change()
RETURNS TRIGGER AS $$
DECLARE
    parent_status entry_status;
BEGIN
    SELECT status INTO parent_status FROM journal_entries WHERE id = OLD.entry_id;
    IF parent_status = 'posted' THEN
        RAISE EXCEPTION 'Cannot modify lines of posted journal entry %', OLD.entry_id;
    END IF;
    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_line_change
BEFORE UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_line_change();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS debt_payments CASCADE;
DROP TABLE IF EXISTS business_events CASCADE;
DROP TABLE IF EXISTS debts CASCADE;
DROP TABLE IF EXISTS expense_categories CASCADE;
DROP TABLE IF EXISTS cash_accounts CASCADE;
DROP TABLE IF EXISTS standard_operation_lines CASCADE;
DROP TABLE IF EXISTS standard_operations CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS financial_periods CASCADE;
DROP TABLE IF EXISTS correspondence_pairs CASCADE;
DROP TABLE IF EXISTS analytical_accounts CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP FUNCTION IF EXISTS check_entry_balance() CASCADE;
DROP FUNCTION IF EXISTS prevent_posted_entry_change() CASCADE;
DROP FUNCTION IF EXISTS prevent_posted_line_change() CASCADE;

DROP TYPE IF EXISTS debt_direction;
DROP TYPE IF EXISTS event_kind;
DROP TYPE IF EXISTS period_type;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS normal_side;
DROP TYPE IF EXISTS account_type;
";
