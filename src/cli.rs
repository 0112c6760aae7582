//! CLI definition using clap

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "mizban")]
#[command(version)]
#[command(about = "MizbanCloud CLI - Manage your cloud infrastructure")]
#[command(long_about = r#"
MizbanCloud CLI - manage Cloud (IaaS), CDN and Support from the terminal.

Command groups:
  login / logout / profile        account and API keys
  server volume snapshot          compute and block storage
  ssh-key firewall network        access and networking
  domain dns ssl cache waf        CDN domains and edge settings
  cluster ddos ratelimit          load balancing and protection
  access-rules custom-pages
  page-rules log-forwarder plan
  ticket                          support tickets

Credentials are stored in ~/.mizbancloud/config.yaml
(override the directory with MIZBAN_CONFIG_DIR).
"#)]
#[command(after_help = r#"
Examples:

  Log in with an API token:
    mizban login --token <TOKEN>

  List servers:
    mizban server list

  Add a DNS record:
    mizban dns add --domain 12 --type A --name api --destination 1.2.3.4

  Purge the CDN cache:
    mizban cache purge --domain 12 --all

Subcommand help:
    mizban server --help
    mizban dns --help
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Machine output mode (Pebble JSON Lines)
    #[arg(long, global = true)]
    pub agent: bool,

    /// Print decoded API data as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API base URL for this invocation (not saved)
    #[arg(long, global = true, env = "MIZBAN_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with an API token
    Login(LoginArgs),

    /// Clear saved credentials
    Logout,

    /// View and update your profile and API keys
    Profile(ProfileCommand),

    /// Cloud servers
    #[command(visible_aliases = ["srv", "servers"])]
    Server(ServerCommand),

    /// Block storage volumes
    #[command(visible_alias = "volumes")]
    Volume(VolumeCommand),

    /// Server snapshots
    #[command(visible_alias = "snapshots")]
    Snapshot(SnapshotCommand),

    /// SSH keys
    #[command(visible_alias = "ssh-keys")]
    SshKey(SshKeyCommand),

    /// Cloud firewalls
    Firewall(FirewallCommand),

    /// Private networks
    #[command(visible_alias = "networks")]
    Network(NetworkCommand),

    /// CDN domains
    #[command(visible_alias = "domains")]
    Domain(DomainCommand),

    /// CDN DNS records
    Dns(DnsCommand),

    /// CDN SSL/HTTPS settings
    Ssl(SslCommand),

    /// CDN cache and acceleration
    Cache(CacheCommand),

    /// CDN web application firewall
    Waf(WafCommand),

    /// CDN load balancing clusters
    #[command(visible_alias = "lb")]
    Cluster(ClusterCommand),

    /// CDN DDoS protection
    Ddos(DdosCommand),

    /// CDN rate limiting
    #[command(visible_alias = "rate-limit")]
    Ratelimit(RatelimitCommand),

    /// CDN IP/country access rules
    AccessRules(AccessRulesCommand),

    /// CDN custom error pages
    CustomPages(CustomPagesCommand),

    /// CDN page rules
    PageRules(PageRulesCommand),

    /// CDN log forwarding
    LogForwarder(LogForwarderCommand),

    /// CDN plans
    #[command(visible_alias = "plans")]
    Plan(PlanCommand),

    /// Support tickets
    #[command(visible_aliases = ["tickets", "support"])]
    Ticket(TicketCommand),
}

// ============ Shared Args ============

/// CDN domain selector
#[derive(Args, Debug, Clone, Copy)]
pub struct DomainArg {
    /// Domain ID (from `mizban domain list`)
    #[arg(short, long)]
    pub domain: u64,
}

/// On/off switch that defaults to on; pass `--enabled=false` to turn off
#[derive(Args, Debug, Clone, Copy)]
pub struct EnabledArg {
    #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub enabled: bool,
}

// ============ Auth Commands ============

#[derive(Args)]
#[command(after_help = "Examples:
  mizban login --token <TOKEN>
  mizban login --url http://127.0.0.1:8003/api")]
pub struct LoginArgs {
    /// API token (prompted if omitted)
    #[arg(short, long, env = "MIZBAN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API base URL to save with the token
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show profile information
    Show,

    /// Update profile information
    #[command(after_help = "Examples:
  mizban profile update --name 'Sara Ahmadi' --phone 09120000000")]
    Update {
        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Manage API keys
    ApiKeys(ApiKeysCommand),
}

#[derive(Args)]
pub struct ApiKeysCommand {
    #[command(subcommand)]
    pub action: ApiKeysAction,
}

#[derive(Subcommand)]
pub enum ApiKeysAction {
    /// List API keys
    List,

    /// Create a new API key
    Create {
        /// Name for the API key
        #[arg(long)]
        name: String,
    },

    /// Delete an API key
    Delete {
        /// API key ID
        id: u64,
    },
}

// ============ Server Commands ============

#[derive(Args)]
pub struct ServerCommand {
    #[command(subcommand)]
    pub action: ServerAction,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PowerAction {
    On,
    Off,
    Reboot,
    Restart,
}

impl PowerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Reboot => "reboot",
            Self::Restart => "restart",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RescueAction {
    Enable,
    Disable,
}

#[derive(Subcommand)]
pub enum ServerAction {
    /// List all servers
    List,

    /// Create a new server
    #[command(after_help = "Examples:
  mizban server create --name web-1 --os ubuntu-22.04 --cpu 2 --ram 2048")]
    Create {
        /// Server name
        #[arg(long)]
        name: String,

        /// Operating system (e.g., ubuntu-22.04)
        #[arg(long)]
        os: String,

        /// Number of CPU cores
        #[arg(long, default_value_t = 1)]
        cpu: u32,

        /// RAM in MB
        #[arg(long, default_value_t = 1024)]
        ram: u32,

        /// Storage in GB
        #[arg(long, default_value_t = 20)]
        storage: u32,

        /// Datacenter ID
        #[arg(long, default_value_t = 1)]
        datacenter: u64,

        /// SSH key ID
        #[arg(long)]
        ssh_key: Option<u64>,
    },

    /// Get server details
    Get {
        /// Server ID
        id: u64,
    },

    /// Delete a server
    Delete {
        /// Server ID
        id: u64,
    },

    /// Power management
    #[command(after_help = "Examples:
  mizban server power reboot 42")]
    Power {
        #[arg(value_enum)]
        action: PowerAction,

        /// Server ID
        id: u64,
    },

    /// Rename a server
    Rename {
        /// Server ID
        id: u64,

        /// New server name
        #[arg(long)]
        name: String,
    },

    /// Get VNC console URL
    Vnc {
        /// Server ID
        id: u64,
    },

    /// Get server action logs
    Logs {
        /// Server ID
        id: u64,
    },

    /// Get server performance reports
    Reports {
        /// Server ID
        id: u64,
    },

    /// Rebuild server with a new OS
    Rebuild {
        /// Server ID
        id: u64,

        /// New operating system
        #[arg(long)]
        os: String,
    },

    /// Rescue mode
    Rescue {
        #[arg(value_enum)]
        action: RescueAction,

        /// Server ID
        id: u64,
    },
}

// ============ Volume Commands ============

#[derive(Args)]
pub struct VolumeCommand {
    #[command(subcommand)]
    pub action: VolumeAction,
}

#[derive(Subcommand)]
pub enum VolumeAction {
    /// List volumes
    List,

    /// Create a new volume
    Create {
        /// Volume name
        #[arg(long)]
        name: String,

        /// Volume size in GB
        #[arg(long, default_value_t = 10)]
        size: u32,

        /// Datacenter ID
        #[arg(long, default_value_t = 1)]
        datacenter: u64,
    },

    /// Get volume details
    Get {
        /// Volume ID
        id: u64,
    },

    /// Delete a volume
    Delete {
        /// Volume ID
        id: u64,
    },

    /// Attach volume to a server
    Attach {
        /// Volume ID
        id: u64,

        /// Server ID to attach to
        #[arg(long)]
        server: u64,
    },

    /// Detach volume from a server
    Detach {
        /// Volume ID
        id: u64,

        /// Server ID to detach from
        #[arg(long)]
        server: u64,
    },

    /// Resize a volume
    Resize {
        /// Volume ID
        id: u64,

        /// New size in GB
        #[arg(long)]
        size: u32,
    },
}

// ============ Snapshot Commands ============

#[derive(Args)]
pub struct SnapshotCommand {
    #[command(subcommand)]
    pub action: SnapshotAction,
}

#[derive(Subcommand)]
pub enum SnapshotAction {
    /// List snapshots
    List,

    /// Snapshot a server
    Create {
        /// Snapshot name
        #[arg(long)]
        name: String,

        /// Server ID to snapshot
        #[arg(long)]
        server: u64,
    },

    /// Get snapshot details
    Get {
        /// Snapshot ID
        id: u64,
    },

    /// Delete a snapshot
    Delete {
        /// Snapshot ID
        id: u64,
    },
}

// ============ SSH Key Commands ============

#[derive(Args)]
pub struct SshKeyCommand {
    #[command(subcommand)]
    pub action: SshKeyAction,
}

#[derive(Subcommand)]
pub enum SshKeyAction {
    /// List SSH keys
    List,

    /// Add a public key
    #[command(after_help = "Examples:
  mizban ssh-key add --name laptop --key \"$(cat ~/.ssh/id_ed25519.pub)\"")]
    Add {
        /// Key name
        #[arg(long)]
        name: String,

        /// Public key content
        #[arg(long)]
        key: String,
    },

    /// Get SSH key details
    Get {
        /// Key ID
        id: u64,
    },

    /// Delete an SSH key
    Delete {
        /// Key ID
        id: u64,
    },

    /// Generate a new key pair server-side
    Generate,
}

// ============ Firewall Commands ============

#[derive(Args)]
pub struct FirewallCommand {
    #[command(subcommand)]
    pub action: FirewallAction,
}

#[derive(Subcommand)]
pub enum FirewallAction {
    /// List firewalls
    List,

    /// Create a new firewall
    Create {
        /// Firewall name
        #[arg(long)]
        name: String,
    },

    /// Delete a firewall
    Delete {
        /// Firewall ID
        id: u64,
    },

    /// Manage firewall rules
    Rule(FirewallRuleCommand),

    /// Attach firewall to a server
    Attach {
        /// Firewall ID
        id: u64,

        /// Server ID
        #[arg(long)]
        server: u64,
    },

    /// Detach firewall from a server
    Detach {
        /// Firewall ID
        id: u64,

        /// Server ID
        #[arg(long)]
        server: u64,
    },
}

#[derive(Args)]
pub struct FirewallRuleCommand {
    #[command(subcommand)]
    pub action: FirewallRuleAction,
}

#[derive(Subcommand)]
pub enum FirewallRuleAction {
    /// Add a firewall rule
    #[command(after_help = "Examples:
  mizban firewall rule add --firewall 3 --port-min 22
  mizban firewall rule add --firewall 3 --protocol udp --port-min 5000 --port-max 5100")]
    Add {
        /// Firewall ID
        #[arg(long)]
        firewall: u64,

        /// Rule direction (ingress/egress)
        #[arg(long, default_value = "ingress")]
        direction: String,

        /// Protocol (tcp/udp/icmp)
        #[arg(long, default_value = "tcp")]
        protocol: String,

        /// Minimum port
        #[arg(long)]
        port_min: u16,

        /// Maximum port (default: same as port-min)
        #[arg(long)]
        port_max: Option<u16>,

        /// Remote IP CIDR
        #[arg(long, default_value = "0.0.0.0/0")]
        remote_ip: String,
    },

    /// Delete a firewall rule
    Delete {
        /// Rule ID
        id: u64,
    },
}

// ============ Network Commands ============

#[derive(Args)]
pub struct NetworkCommand {
    #[command(subcommand)]
    pub action: NetworkAction,
}

#[derive(Subcommand)]
pub enum NetworkAction {
    /// List private networks
    List,

    /// Create a private network
    Create {
        /// Network name
        #[arg(long)]
        name: String,

        /// Network CIDR
        #[arg(long, default_value = "10.0.0.0/24")]
        cidr: String,

        /// Datacenter ID
        #[arg(long, default_value_t = 1)]
        datacenter: u64,
    },

    /// Delete a private network
    Delete {
        /// Network ID
        id: u64,
    },

    /// Attach a server to a private network
    Attach {
        /// Network ID
        id: u64,

        /// Server ID
        #[arg(long)]
        server: u64,

        /// Specific IP address
        #[arg(long)]
        ip: Option<String>,
    },

    /// Detach a server from a private network
    Detach {
        /// Network ID
        id: u64,

        /// Server ID
        #[arg(long)]
        server: u64,
    },
}

// ============ Domain Commands ============

#[derive(Args)]
pub struct DomainCommand {
    #[command(subcommand)]
    pub action: DomainAction,
}

#[derive(Subcommand)]
pub enum DomainAction {
    /// List all domains
    List,

    /// Add a new domain
    #[command(after_help = "Examples:
  mizban domain add --name example.com")]
    Add {
        /// Domain name to add
        #[arg(long)]
        name: String,
    },

    /// Get domain details
    Get {
        /// Domain ID
        id: u64,
    },

    /// Delete a domain
    Delete {
        /// Domain ID
        id: u64,
    },

    /// Traffic usage
    Usage {
        /// Domain ID
        id: u64,
    },

    /// WHOIS information
    Whois {
        /// Domain ID
        id: u64,
    },

    /// Traffic reports
    Reports {
        #[command(flatten)]
        target: DomainArg,

        /// Time period (hour/day/week/month)
        #[arg(long, default_value = "day")]
        period: String,
    },

    /// Set redirect mode (none/www/naked)
    RedirectMode {
        #[command(flatten)]
        target: DomainArg,

        /// none, www or naked
        #[arg(long)]
        mode: String,
    },
}

// ============ DNS Commands ============

#[derive(Args)]
pub struct DnsCommand {
    #[command(subcommand)]
    pub action: DnsAction,
}

/// Fields shared by `dns add` and `dns update`
#[derive(Args, Debug, Clone)]
pub struct DnsRecordArgs {
    /// Record type (A, AAAA, CNAME, MX, TXT, ...)
    #[arg(long = "type")]
    pub record_type: String,

    /// Record name (@ for root)
    #[arg(long)]
    pub name: String,

    /// Record value
    #[arg(long)]
    pub destination: String,

    /// TTL in seconds
    #[arg(long, default_value_t = 3600)]
    pub ttl: u32,

    /// Priority (MX records)
    #[arg(long)]
    pub priority: Option<u32>,

    /// Port for proxied records with a custom port
    #[arg(long)]
    pub port: Option<u16>,

    /// Protocol (DEFAULT/HTTPS/HTTP)
    #[arg(long, default_value = "DEFAULT")]
    pub protocol: String,

    /// Enable CDN proxy
    #[arg(long)]
    pub proxy: bool,
}

#[derive(Subcommand)]
pub enum DnsAction {
    /// List DNS records
    List {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Get a single DNS record
    Get {
        #[command(flatten)]
        target: DomainArg,

        /// Record ID
        id: u64,
    },

    /// Add a DNS record
    #[command(after_help = "Examples:
  mizban dns add --domain 12 --type A --name www --destination 1.2.3.4 --proxy
  mizban dns add --domain 12 --type MX --name @ --destination mail.example.com --priority 10")]
    Add {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        record: DnsRecordArgs,
    },

    /// Update a DNS record
    Update {
        #[command(flatten)]
        target: DomainArg,

        /// Record ID
        #[arg(long)]
        record: u64,

        #[command(flatten)]
        fields: DnsRecordArgs,
    },

    /// Delete a DNS record
    Delete {
        #[command(flatten)]
        target: DomainArg,

        /// Record ID
        id: u64,
    },

    /// List records that can be proxied through the CDN
    Proxiable {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Import a zone file
    Import {
        #[command(flatten)]
        target: DomainArg,

        /// Path to a BIND zone file
        #[arg(long)]
        file: std::path::PathBuf,
    },

    /// Export the zone file
    Export {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Discover records from the current authoritative nameservers
    FetchRecords {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Custom (vanity) nameservers
    CustomNs(CustomNsCommand),

    /// DNSSEC settings
    Dnssec(DnssecCommand),
}

#[derive(Args)]
pub struct CustomNsCommand {
    #[command(subcommand)]
    pub action: CustomNsAction,
}

#[derive(Subcommand)]
pub enum CustomNsAction {
    /// Show custom nameservers
    Get {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Set custom nameservers
    Set {
        #[command(flatten)]
        target: DomainArg,

        /// Primary nameserver
        #[arg(long)]
        ns1: String,

        /// Secondary nameserver
        #[arg(long)]
        ns2: String,
    },

    /// Remove custom nameservers
    Delete {
        #[command(flatten)]
        target: DomainArg,
    },
}

#[derive(Args)]
pub struct DnssecCommand {
    #[command(subcommand)]
    pub action: DnssecAction,
}

#[derive(Subcommand)]
pub enum DnssecAction {
    /// Show DNSSEC status and DS record
    Status {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Enable DNSSEC
    Enable {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Disable DNSSEC
    Disable {
        #[command(flatten)]
        target: DomainArg,
    },
}

// ============ SSL Commands ============

#[derive(Args)]
pub struct SslCommand {
    #[command(subcommand)]
    pub action: SslAction,
}

#[derive(Subcommand)]
pub enum SslAction {
    /// Certificate details
    Info {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Current HTTPS configuration
    Status {
        #[command(flatten)]
        target: DomainArg,
    },

    /// List certificates
    List {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Attach the default certificate
    AttachDefault {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Detach the default certificate
    DetachDefault {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Attach a certificate to DNS records
    Attach {
        #[command(flatten)]
        target: DomainArg,

        /// Certificate ID
        #[arg(long)]
        cert: u64,

        /// DNS record IDs (comma separated)
        #[arg(long, value_delimiter = ',', required = true)]
        records: Vec<u64>,
    },

    /// Detach certificates from DNS records
    Detach {
        #[command(flatten)]
        target: DomainArg,

        /// DNS record IDs (comma separated)
        #[arg(long, value_delimiter = ',', required = true)]
        records: Vec<u64>,
    },

    /// Request a free certificate
    RequestFree {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Upload a custom certificate
    #[command(after_help = "Examples:
  mizban ssl add-custom --domain 12 --cert cert.pem --key key.pem --chain chain.pem")]
    AddCustom {
        #[command(flatten)]
        target: DomainArg,

        /// Certificate PEM file
        #[arg(long)]
        cert: std::path::PathBuf,

        /// Private key PEM file
        #[arg(long)]
        key: std::path::PathBuf,

        /// Chain PEM file
        #[arg(long)]
        chain: Option<std::path::PathBuf>,
    },

    /// Delete a certificate
    Delete {
        #[command(flatten)]
        target: DomainArg,

        /// Certificate ID
        id: u64,
    },

    /// HTTPS settings
    Settings(SslSettingsCommand),
}

#[derive(Args)]
pub struct SslSettingsCommand {
    #[command(subcommand)]
    pub action: SslSettingsAction,
}

#[derive(Subcommand)]
pub enum SslSettingsAction {
    /// Minimum TLS version
    TlsVersion {
        #[command(flatten)]
        target: DomainArg,

        /// 1.0, 1.1, 1.2 or 1.3
        #[arg(long, default_value = "1.2")]
        version: String,
    },

    /// HTTP Strict Transport Security
    Hsts {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,

        /// Max age in seconds
        #[arg(long, default_value_t = 31_536_000)]
        max_age: u64,

        /// Include subdomains
        #[arg(long)]
        include_subdomains: bool,

        /// Enable preload
        #[arg(long)]
        preload: bool,
    },

    /// Redirect HTTP to HTTPS
    Redirect {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,
    },

    /// Protocol used towards the origin (http/https/auto)
    BackendProtocol {
        #[command(flatten)]
        target: DomainArg,

        #[arg(long, default_value = "https")]
        protocol: String,
    },

    /// HTTP/3
    H3 {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,
    },

    /// Content-Security-Policy override
    CspOverride {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,
    },
}

// ============ Cache Commands ============

#[derive(Args)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show cache settings
    Status {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Set edge cache mode (standard/aggressive/no-cache)
    Mode {
        #[command(flatten)]
        target: DomainArg,

        #[arg(long, default_value = "aggressive")]
        mode: String,
    },

    /// Set edge cache TTL
    Ttl {
        #[command(flatten)]
        target: DomainArg,

        /// Cache mode (standard/aggressive/no-cache)
        #[arg(long, default_value = "aggressive")]
        mode: String,

        /// TTL in seconds
        #[arg(long, default_value_t = 86_400)]
        ttl: u32,
    },

    /// Browser cache policy (respect/override)
    Browser {
        #[command(flatten)]
        target: DomainArg,

        #[arg(long, default_value = "respect")]
        mode: String,

        /// TTL in seconds
        #[arg(long, default_value_t = 86_400)]
        ttl: u32,
    },

    /// TTL for cached error responses
    ErrorsTtl {
        #[command(flatten)]
        target: DomainArg,

        /// TTL in seconds
        #[arg(long, default_value_t = 300)]
        ttl: u32,
    },

    /// Serve stale content while the origin is down
    AlwaysOnline {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,
    },

    /// Cache responses that set cookies
    CacheCookies {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,
    },

    /// Bypass the cache while developing
    DevMode {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,
    },

    /// Purge cached content
    #[command(after_help = "Examples:
  mizban cache purge --domain 12 --all
  mizban cache purge --domain 12 --url https://example.com/app.js --url https://example.com/app.css")]
    Purge {
        #[command(flatten)]
        target: DomainArg,

        /// URL to purge (repeatable)
        #[arg(long = "url", conflicts_with = "all", required_unless_present = "all")]
        urls: Vec<String>,

        /// Purge everything
        #[arg(long)]
        all: bool,
    },

    /// Minify assets
    Minify {
        #[command(flatten)]
        target: DomainArg,

        /// Minify HTML
        #[arg(long)]
        html: bool,

        /// Minify CSS
        #[arg(long)]
        css: bool,

        /// Minify JavaScript
        #[arg(long)]
        js: bool,
    },

    /// Image optimization
    Image(ImageCommand),
}

#[derive(Args)]
pub struct ImageCommand {
    #[command(subcommand)]
    pub action: ImageAction,
}

#[derive(Subcommand)]
pub enum ImageAction {
    /// Serve WebP where supported
    Webp {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,
    },

    /// On-the-fly image resizing
    Resize {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,
    },
}

// ============ WAF Commands ============

#[derive(Args)]
pub struct WafCommand {
    #[command(subcommand)]
    pub action: WafAction,
}

#[derive(Subcommand)]
pub enum WafAction {
    /// Show WAF status
    Status {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Enable the WAF
    Enable {
        #[command(flatten)]
        target: DomainArg,

        /// block or simulate
        #[arg(long, default_value = "block")]
        mode: String,
    },

    /// Disable the WAF
    Disable {
        #[command(flatten)]
        target: DomainArg,
    },

    /// List WAF layers
    Layers {
        #[command(flatten)]
        target: DomainArg,
    },

    /// WAF rules
    Rules(WafRulesCommand),

    /// WAF rule groups
    Groups(WafGroupsCommand),
}

#[derive(Args)]
pub struct WafRulesCommand {
    #[command(subcommand)]
    pub action: WafRulesAction,
}

#[derive(Subcommand)]
pub enum WafRulesAction {
    /// List rules
    List {
        #[command(flatten)]
        target: DomainArg,
    },

    /// List disabled rules
    Disabled {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Enable or disable one rule
    Toggle {
        #[command(flatten)]
        target: DomainArg,

        /// Rule ID
        #[arg(long)]
        rule: String,

        #[command(flatten)]
        switch: EnabledArg,
    },
}

#[derive(Args)]
pub struct WafGroupsCommand {
    #[command(subcommand)]
    pub action: WafGroupsAction,
}

#[derive(Subcommand)]
pub enum WafGroupsAction {
    /// Enable or disable a rule group
    Toggle {
        #[command(flatten)]
        target: DomainArg,

        /// Group ID
        #[arg(long)]
        group: String,

        #[command(flatten)]
        switch: EnabledArg,
    },
}

// ============ Cluster Commands ============

#[derive(Args)]
pub struct ClusterCommand {
    #[command(subcommand)]
    pub action: ClusterAction,
}

/// Pool settings shared by `cluster add` and `cluster update`
#[derive(Args, Debug, Clone)]
pub struct ClusterArgs {
    /// Pool name
    #[arg(long)]
    pub name: String,

    /// Backend port
    #[arg(long, default_value_t = 443)]
    pub port: u16,

    /// roundrobin, leastconn or iphash
    #[arg(long, default_value = "roundrobin")]
    pub method: String,

    /// Pool description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Hash key for the iphash method
    #[arg(long)]
    pub hash_key: Option<String>,

    /// Report backend errors
    #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub error_reporting: bool,
}

#[derive(Subcommand)]
pub enum ClusterAction {
    /// List clusters and their servers
    List {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Show which paths use which cluster
    Assignments {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Create a cluster
    Add {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        pool: ClusterArgs,
    },

    /// Update a cluster
    Update {
        #[command(flatten)]
        target: DomainArg,

        /// Cluster ID
        #[arg(long)]
        cluster: u64,

        #[command(flatten)]
        pool: ClusterArgs,
    },

    /// Delete a cluster
    Delete {
        #[command(flatten)]
        target: DomainArg,

        /// Cluster ID
        #[arg(long)]
        cluster: u64,
    },

    /// Assign a cluster to a path
    Assign {
        #[command(flatten)]
        target: DomainArg,

        /// Cluster ID
        #[arg(long)]
        cluster: u64,

        /// Path ID
        #[arg(long)]
        path: u64,
    },

    /// Remove a cluster from a path
    Unassign {
        #[command(flatten)]
        target: DomainArg,

        /// Cluster ID
        #[arg(long)]
        cluster: u64,

        /// Path ID
        #[arg(long)]
        path: u64,
    },

    /// Backend servers of a cluster
    Server(ClusterServerCommand),
}

#[derive(Args)]
pub struct ClusterServerCommand {
    #[command(subcommand)]
    pub action: ClusterServerAction,
}

#[derive(Subcommand)]
pub enum ClusterServerAction {
    /// Add a backend server
    #[command(after_help = "Examples:
  mizban cluster server add --domain 12 --cluster 4 --address 10.0.0.5 --port 8080 --protocol HTTP")]
    Add {
        #[command(flatten)]
        target: DomainArg,

        /// Cluster ID
        #[arg(long)]
        cluster: u64,

        /// IP or hostname
        #[arg(long)]
        address: String,

        /// Server port
        #[arg(long, default_value_t = 443)]
        port: u16,

        /// Weight (1-100)
        #[arg(long, default_value_t = 100)]
        weight: u32,

        /// Priority
        #[arg(long, default_value_t = 1)]
        priority: u32,

        /// HTTP or HTTPS
        #[arg(long, default_value = "HTTPS")]
        protocol: String,

        /// Custom Host header
        #[arg(long)]
        host_header: Option<String>,
    },

    /// Remove a backend server
    Delete {
        #[command(flatten)]
        target: DomainArg,

        /// Cluster ID
        #[arg(long)]
        cluster: u64,

        /// Server ID
        #[arg(long)]
        server: u64,
    },
}

// ============ DDoS Commands ============

#[derive(Args)]
pub struct DdosCommand {
    #[command(subcommand)]
    pub action: DdosAction,
}

#[derive(Subcommand)]
pub enum DdosAction {
    /// Show DDoS protection settings
    Status {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Set protection mode (off/normal/high/under_attack)
    Mode {
        #[command(flatten)]
        target: DomainArg,

        #[arg(long, default_value = "normal")]
        mode: String,
    },

    /// Set captcha module (recaptcha/hcaptcha/turnstile)
    Captcha {
        #[command(flatten)]
        target: DomainArg,

        #[arg(long, default_value = "recaptcha")]
        module: String,
    },

    /// Challenge TTLs
    Ttl {
        /// cookie, js or captcha
        #[arg(value_enum)]
        challenge: ChallengeKind,

        #[command(flatten)]
        target: DomainArg,

        /// TTL in seconds
        #[arg(long, default_value_t = 3600)]
        ttl: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ChallengeKind {
    Cookie,
    Js,
    Captcha,
}

impl ChallengeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cookie => "cookie",
            Self::Js => "js",
            Self::Captcha => "captcha",
        }
    }
}

// ============ Rate Limit Commands ============

#[derive(Args)]
pub struct RatelimitCommand {
    #[command(subcommand)]
    pub action: RatelimitAction,
}

#[derive(Subcommand)]
pub enum RatelimitAction {
    /// Show rate limit settings
    Status {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Configure rate limiting
    #[command(after_help = "Examples:
  mizban ratelimit set --domain 12 --request-count 200 --block-time 120 --ips 10.0.0.1,10.0.0.2")]
    Set {
        #[command(flatten)]
        target: DomainArg,

        #[command(flatten)]
        switch: EnabledArg,

        /// Max requests per second (1-1000)
        #[arg(long, default_value_t = 100)]
        request_count: u32,

        /// Block duration in seconds (1-1000)
        #[arg(long, default_value_t = 60)]
        block_time: u32,

        /// Whitelisted HTTP methods
        #[arg(long, value_delimiter = ',')]
        methods: Vec<String>,

        /// Whitelisted IP addresses
        #[arg(long, value_delimiter = ',')]
        ips: Vec<String>,

        /// Whitelisted country codes
        #[arg(long, value_delimiter = ',')]
        countries: Vec<String>,
    },

    /// Enable with empty whitelists
    Enable {
        #[command(flatten)]
        target: DomainArg,

        /// Max requests per second
        #[arg(long, default_value_t = 100)]
        request_count: u32,

        /// Block duration in seconds
        #[arg(long, default_value_t = 60)]
        block_time: u32,
    },

    /// Disable, keeping the current limits and whitelists
    Disable {
        #[command(flatten)]
        target: DomainArg,
    },
}

// ============ Access Rules Commands ============

#[derive(Args)]
pub struct AccessRulesCommand {
    #[command(subcommand)]
    pub action: AccessRulesAction,
}

#[derive(Subcommand)]
pub enum AccessRulesAction {
    /// Show IP and country rules
    Status {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Add an IP rule
    AddIp {
        #[command(flatten)]
        target: DomainArg,

        /// IP address or CIDR
        #[arg(long)]
        ip: String,

        /// block, allow or challenge
        #[arg(long, default_value = "block")]
        action: String,
    },

    /// Remove an IP rule
    RemoveIp {
        #[command(flatten)]
        target: DomainArg,

        /// IP address or CIDR
        #[arg(long)]
        ip: String,
    },

    /// Add a country rule
    AddCountry {
        #[command(flatten)]
        target: DomainArg,

        /// Country code (e.g., US, DE, IR)
        #[arg(long)]
        country: String,

        /// block, allow or challenge
        #[arg(long, default_value = "block")]
        action: String,
    },

    /// Remove a country rule
    RemoveCountry {
        #[command(flatten)]
        target: DomainArg,

        /// Country code
        #[arg(long)]
        country: String,
    },
}

// ============ Custom Pages Commands ============

#[derive(Args)]
pub struct CustomPagesCommand {
    #[command(subcommand)]
    pub action: CustomPagesAction,
}

#[derive(Subcommand)]
pub enum CustomPagesAction {
    /// Show configured error pages
    Get {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Set the HTML for an error code
    #[command(after_help = "Examples:
  mizban custom-pages set --domain 12 --code 404 --html ./404.html")]
    Set {
        #[command(flatten)]
        target: DomainArg,

        /// 403, 404, 500, 502, 503 or 504
        #[arg(long)]
        code: u16,

        /// HTML file
        #[arg(long)]
        html: std::path::PathBuf,
    },

    /// Restore default error pages
    Delete {
        #[command(flatten)]
        target: DomainArg,

        /// Error code
        #[arg(long)]
        code: u16,
    },
}

// ============ Page Rules Commands ============

#[derive(Args)]
pub struct PageRulesCommand {
    #[command(subcommand)]
    pub action: PageRulesAction,
}

#[derive(Subcommand)]
pub enum PageRulesAction {
    /// List page rule paths
    List {
        #[command(flatten)]
        target: DomainArg,

        /// all, waf, ratelimit, ddos or firewall
        #[arg(long = "type", default_value = "all")]
        rule_type: String,
    },

    /// Add a path pattern
    AddPath {
        #[command(flatten)]
        target: DomainArg,

        /// URL path pattern
        #[arg(long)]
        path: String,

        /// Lower runs first
        #[arg(long, default_value_t = 10)]
        priority: u32,
    },

    /// Delete a path pattern
    DeletePath {
        #[command(flatten)]
        target: DomainArg,

        /// Path ID
        id: u64,
    },

    /// Set a rule on a path
    #[command(after_help = r#"Examples:
  mizban page-rules set-rule --domain 12 --path 3 --type cache --settings '{"ttl": 600}'"#)]
    SetRule {
        #[command(flatten)]
        target: DomainArg,

        /// Path ID
        #[arg(long)]
        path: u64,

        /// cache, waf, ratelimit, ddos or firewall
        #[arg(long = "type")]
        rule_type: String,

        /// Rule settings as a JSON object
        #[arg(long, default_value = "{}")]
        settings: String,
    },

    /// Delete a rule from a path
    DeleteRule {
        #[command(flatten)]
        target: DomainArg,

        /// Path ID
        #[arg(long)]
        path: u64,

        /// Rule type
        #[arg(long = "type")]
        rule_type: String,
    },
}

// ============ Log Forwarder Commands ============

#[derive(Args)]
pub struct LogForwarderCommand {
    #[command(subcommand)]
    pub action: LogForwarderAction,
}

#[derive(Subcommand)]
pub enum LogForwarderAction {
    /// List log forwarders
    List {
        #[command(flatten)]
        target: DomainArg,
    },

    /// Add a log forwarder
    #[command(after_help = r#"Examples:
  mizban log-forwarder add --domain 12 --name es --type elasticsearch --endpoint https://es.example.com:9200
  mizban log-forwarder add --domain 12 --name hook --type http --endpoint https://logs.example.com --config '{"token":"abc"}'"#)]
    Add {
        #[command(flatten)]
        target: DomainArg,

        /// Forwarder name
        #[arg(long)]
        name: String,

        /// elasticsearch, s3, http or datadog
        #[arg(long = "type")]
        forwarder_type: String,

        /// Destination endpoint URL
        #[arg(long)]
        endpoint: String,

        #[command(flatten)]
        switch: EnabledArg,

        /// Extra settings as a JSON object
        #[arg(long)]
        config: Option<String>,
    },

    /// Update a log forwarder
    Update {
        #[command(flatten)]
        target: DomainArg,

        /// Forwarder ID
        #[arg(long)]
        forwarder: u64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New endpoint
        #[arg(long)]
        endpoint: Option<String>,

        #[command(flatten)]
        switch: EnabledArg,
    },

    /// Delete a log forwarder
    Delete {
        #[command(flatten)]
        target: DomainArg,

        /// Forwarder ID
        id: u64,
    },
}

// ============ Plan Commands ============

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub action: PlanAction,
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// List CDN plans
    List,
}

// ============ Ticket Commands ============

#[derive(Args)]
pub struct TicketCommand {
    #[command(subcommand)]
    pub action: TicketAction,
}

#[derive(Subcommand)]
pub enum TicketAction {
    /// List tickets
    List {
        /// open, closed or pending
        #[arg(long)]
        status: Option<String>,
    },

    /// Open a new ticket
    #[command(after_help = "Examples:
  mizban ticket create --subject 'Server unreachable' --message 'Server 42 stopped responding' --priority high")]
    Create {
        /// Ticket subject
        #[arg(long)]
        subject: String,

        /// Ticket message
        #[arg(long)]
        message: String,

        /// support, billing or technical
        #[arg(long, default_value = "support")]
        department: String,

        /// low, normal, high or urgent
        #[arg(long, default_value = "normal")]
        priority: String,
    },

    /// Show a ticket with its replies
    Get {
        /// Ticket ID
        id: u64,
    },

    /// Reply to a ticket
    Reply {
        /// Ticket ID
        id: u64,

        /// Reply message
        #[arg(long)]
        message: String,
    },

    /// Close a ticket
    Close {
        /// Ticket ID
        id: u64,
    },

    /// List departments
    Departments,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn enabled_switch_defaults_on_and_accepts_false() {
        let cli = Cli::try_parse_from(["mizban", "cache", "dev-mode", "--domain", "3"]).unwrap();
        match cli.command {
            Some(Commands::Cache(CacheCommand {
                action: CacheAction::DevMode { target, switch },
            })) => {
                assert_eq!(target.domain, 3);
                assert!(switch.enabled);
            }
            _ => panic!("wrong command"),
        }

        let cli =
            Cli::try_parse_from(["mizban", "cache", "dev-mode", "-d", "3", "--enabled=false"]).unwrap();
        match cli.command {
            Some(Commands::Cache(CacheCommand {
                action: CacheAction::DevMode { switch, .. },
            })) => assert!(!switch.enabled),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn purge_requires_urls_or_all() {
        assert!(Cli::try_parse_from(["mizban", "cache", "purge", "--domain", "1"]).is_err());
        assert!(Cli::try_parse_from(["mizban", "cache", "purge", "--domain", "1", "--all"]).is_ok());
        assert!(Cli::try_parse_from([
            "mizban", "cache", "purge", "--domain", "1", "--url", "https://a/x", "--all"
        ])
        .is_err());
    }

    #[test]
    fn aliases_and_global_flags() {
        let cli = Cli::try_parse_from(["mizban", "srv", "power", "reboot", "42", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Server(ServerCommand {
                action: ServerAction::Power { action, id },
            })) => {
                assert_eq!(action.as_str(), "reboot");
                assert_eq!(id, 42);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn comma_separated_record_ids() {
        let cli = Cli::try_parse_from([
            "mizban", "ssl", "attach", "--domain", "5", "--cert", "9", "--records", "1,2,3",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Ssl(SslCommand {
                action: SslAction::Attach { records, cert, .. },
            })) => {
                assert_eq!(cert, 9);
                assert_eq!(records, vec![1, 2, 3]);
            }
            _ => panic!("wrong command"),
        }
    }
}
