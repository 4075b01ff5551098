//! JavaScript for script-capable browser surfaces.
//!
//! A host injects [`script_source`] after every page-finished event and
//! forwards whatever the page passes to `window.__scoutBridge.postMessage`
//! as a raw message string. Every script guards itself with a flag on
//! `window`, so repeated injection for the same navigation is harmless.

use scout_core::Script;

use crate::poll::PollSettings;

/// Name of the object the host must expose on `window`.
pub const BRIDGE_OBJECT: &str = "__scoutBridge";

const INITIAL_RESULTS_JS: &str = r#"
(() => {
    if (window.__scoutInitialResults) { return; }
    window.__scoutInitialResults = true;
    const results = [];
    const list = document.querySelector('#aarecord-list');
    if (list) {
        const items = list.querySelectorAll('a');
        for (let i = 0; i < Math.min(items.length, 10); i++) {
            const item = items[i];
            const heading = item.querySelector('h3');
            const title = (heading ? heading.innerText : item.innerText || '').trim();
            let image = null;
            const cover = item.querySelector('div[id^="list_cover_aarecord_id__md5:"]');
            if (cover) {
                const img = cover.querySelector('img');
                if (img) { image = img.src; }
            }
            results.push({ title: title, url: item.href, image: image });
        }
    }
    window.__scoutBridge.postMessage(JSON.stringify({ type: 'initial-results', payload: results }));
})();
"#;

const SLOW_LINK_JS: &str = r#"
(() => {
    if (window.__scoutSlowLink) { return; }
    window.__scoutSlowLink = true;
    const link = document.querySelector('a[href*="slow_download"]');
    window.__scoutBridge.postMessage(JSON.stringify({
        type: 'slow-link',
        index: __INDEX__,
        payload: link ? link.href : 'Not found'
    }));
})();
"#;

const DOWNLOAD_DISCOVERY_JS: &str = r#"
(() => {
    if (window.__scoutDiscovery) { return; }
    window.__scoutDiscovery = true;
    const post = (message) => window.__scoutBridge.postMessage(JSON.stringify(message));
    const keywords = ['download', '.zip', '.epub', '.pdf', '.mobi'];
    const cdnMarkers = ['cdn', '/d3/'];
    const identifier = (() => {
        const pairs = window.location.search.replace(/^\?/, '').split('&');
        for (const name of ['md5', 'id']) {
            for (const pair of pairs) {
                const eq = pair.indexOf('=');
                if (eq > 0 && decodeURIComponent(pair.slice(0, eq)) === name) {
                    const value = decodeURIComponent(pair.slice(eq + 1).replace(/\+/g, ' '));
                    if (value) { return value.toLowerCase(); }
                    break;
                }
            }
        }
        const segments = window.location.pathname.split('/');
        for (let i = 0; i + 1 < segments.length; i++) {
            if ((segments[i] === 'slow_download' || segments[i] === 'md5') && segments[i + 1]) {
                return segments[i + 1].toLowerCase();
            }
        }
        return null;
    })();
    // In-page and script anchors resolve to the page itself; never candidates.
    const usable = (a) => {
        const raw = (a.getAttribute('href') || '').trim().toLowerCase();
        return raw !== '' && !raw.startsWith('#') && !raw.startsWith('javascript:');
    };
    const discover = () => {
        const button = document.querySelector('p.mb-4.text-xl.font-bold a');
        if (button && usable(button)) { return button.href; }
        const links = Array.from(document.querySelectorAll('a[href]'))
            .filter(usable)
            .map((a) => a.href);
        if (identifier) {
            const cdn = links.find((href) => {
                const lower = href.toLowerCase();
                return lower.includes(identifier) && cdnMarkers.some((m) => lower.includes(m));
            });
            if (cdn) { return cdn; }
        }
        return links.find((href) => {
            const lower = href.toLowerCase();
            return keywords.some((k) => lower.includes(k));
        }) || null;
    };

    let discoveryAttempts = 0;
    const discoveryInterval = setInterval(() => {
        discoveryAttempts++;
        const found = discover();
        if (found) {
            clearInterval(discoveryInterval);
            clearInterval(timerInterval);
            post({ type: 'download-link', payload: found });
        } else if (discoveryAttempts >= __MAX_ATTEMPTS__) {
            clearInterval(discoveryInterval);
            clearInterval(timerInterval);
            post({ type: 'discovery-timeout', attempts: discoveryAttempts });
        }
    }, __INTERVAL_MS__);

    let timerAttempts = 0;
    const timerInterval = setInterval(() => {
        timerAttempts++;
        const timer = document.querySelector('span.js-partner-countdown');
        if (timer) {
            clearInterval(timerInterval);
            post({ type: 'timer', payload: timer.innerText.trim() });
        } else if (timerAttempts >= __MAX_ATTEMPTS__) {
            clearInterval(timerInterval);
        }
    }, __INTERVAL_MS__);

    window.addEventListener('pagehide', () => {
        clearInterval(discoveryInterval);
        clearInterval(timerInterval);
    });
})();
"#;

/// Source text to inject for `script`.
pub fn script_source(script: Script, poll: &PollSettings) -> String {
    match script {
        Script::InitialResults => INITIAL_RESULTS_JS.to_string(),
        Script::SlowLink { index } => SLOW_LINK_JS.replace("__INDEX__", &index.to_string()),
        Script::DownloadDiscovery => DOWNLOAD_DISCOVERY_JS
            .replace("__MAX_ATTEMPTS__", &poll.max_attempts.to_string())
            .replace("__INTERVAL_MS__", &poll.interval.as_millis().max(1).to_string()),
    }
}
