/// The subset of the Perfex CRM schema the report catalog reads.
pub const CRM_TABLES: &str = "
CREATE TABLE IF NOT EXISTS tblclients (
    userid INTEGER PRIMARY KEY,
    company TEXT
);

CREATE TABLE IF NOT EXISTS tblpaymentmodes (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tblinvoices (
    id INTEGER PRIMARY KEY,
    number INTEGER NOT NULL,
    clientid INTEGER,
    date TEXT NOT NULL,
    duedate TEXT,
    subtotal REAL NOT NULL DEFAULT 0,
    total_tax REAL NOT NULL DEFAULT 0,
    total REAL NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS tblinvoicepaymentrecords (
    id INTEGER PRIMARY KEY,
    invoiceid INTEGER NOT NULL,
    amount REAL NOT NULL,
    paymentmode INTEGER,
    date TEXT NOT NULL,
    note TEXT
);

CREATE TABLE IF NOT EXISTS tblestimates (
    id INTEGER PRIMARY KEY,
    number INTEGER NOT NULL,
    clientid INTEGER,
    date TEXT NOT NULL,
    expirydate TEXT,
    subtotal REAL NOT NULL DEFAULT 0,
    total_tax REAL NOT NULL DEFAULT 0,
    total REAL NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS tblproposals (
    id INTEGER PRIMARY KEY,
    subject TEXT NOT NULL,
    rel_id INTEGER,
    rel_type TEXT,
    datecreated TEXT NOT NULL,
    open_till TEXT,
    subtotal REAL NOT NULL DEFAULT 0,
    total_tax REAL NOT NULL DEFAULT 0,
    total REAL NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_invoices_date ON tblinvoices(date);
CREATE INDEX IF NOT EXISTS idx_payments_date ON tblinvoicepaymentrecords(date);
CREATE INDEX IF NOT EXISTS idx_estimates_date ON tblestimates(date);
CREATE INDEX IF NOT EXISTS idx_proposals_datecreated ON tblproposals(datecreated);
";

/// Small fixture covering every report: cancelled and out-of-table invoice
/// statuses, payments without a mode, proposals addressed to leads.
pub const SAMPLE_DATA: &str = "
INSERT INTO tblclients (userid, company) VALUES
    (1, 'Acme Ltd'),
    (2, 'O''Reilly & Sons'),
    (3, 'Globex');

INSERT INTO tblpaymentmodes (id, name) VALUES
    (1, 'Bank Transfer'),
    (2, 'Cash');

INSERT INTO tblinvoices (id, number, clientid, date, duedate, subtotal, total_tax, total, status) VALUES
    (1, 1001, 1, '2024-01-10', '2024-02-10', 1000.0, 200.0, 1200.0, 2),
    (2, 1002, 2, '2024-01-22', '2024-02-22', 500.0, 100.0, 600.0, 1),
    (3, 1003, 3, '2024-02-05', '2024-03-05', 250.0, 50.0, 300.0, 6),
    (4, 1004, 1, '2024-02-18', '2024-03-18', 800.0, 160.0, 960.0, 5),
    (5, 1005, 2, '2024-03-01', '2024-04-01', 100.0, 20.0, 120.0, 3);

INSERT INTO tblinvoicepaymentrecords (id, invoiceid, amount, paymentmode, date, note) VALUES
    (1, 1, 1200.0, 1, '2024-01-25', 'Paid in full'),
    (2, 5, 60.0, 2, '2024-03-10', NULL),
    (3, 2, 100.0, NULL, '2024-03-12', 'Mode not recorded');

INSERT INTO tblestimates (id, number, clientid, date, expirydate, subtotal, total_tax, total, status) VALUES
    (1, 501, 1, '2024-01-05', '2024-02-05', 400.0, 80.0, 480.0, 4),
    (2, 502, 3, '2024-02-11', '2024-03-11', 150.0, 30.0, 180.0, 2);

INSERT INTO tblproposals (id, subject, rel_id, rel_type, datecreated, open_till, subtotal, total_tax, total, status) VALUES
    (1, 'Website redesign', 1, 'customer', '2024-01-03', '2024-02-03', 2000.0, 400.0, 2400.0, 3),
    (2, 'Support retainer', 2, 'lead', '2024-02-14', '2024-03-14', 300.0, 60.0, 360.0, 0);
";
